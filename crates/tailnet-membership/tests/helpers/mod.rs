pub mod fake_directory;
