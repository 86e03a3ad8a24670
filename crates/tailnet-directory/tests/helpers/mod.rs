pub mod mock_directory_server;
