pub mod mock_tasks_server;
