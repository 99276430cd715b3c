use mileage_tracker_data_management::DataManager;

use crate::auth::{password::Passwords, token::TokenSigner};

pub struct ServerState {
    pub data_manager: DataManager,
    pub passwords: Passwords,
    pub tokens: TokenSigner,
}
