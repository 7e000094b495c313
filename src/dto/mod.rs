pub mod auth_dto;
pub mod bon_dto;
pub mod client_dto;
pub mod colis_dto;
pub mod common_dto;
pub mod dashboard_dto;
pub mod entreprise_dto;
pub mod livreur_dto;
pub mod notification_dto;
pub mod search_dto;
pub mod statut_dto;
pub mod user_dto;
