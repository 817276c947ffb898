use axum::extract::FromRef;

use crate::board::MoodBoardService;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedBoardService = Arc<MoodBoardService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub board: GuardedBoardService,
    pub hash: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, board: GuardedBoardService) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            board,
            hash: env!("GIT_HASH").to_string(),
        }
    }
}

impl FromRef<ServerState> for GuardedBoardService {
    fn from_ref(input: &ServerState) -> Self {
        input.board.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
