pub mod record_server;
