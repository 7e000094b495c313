use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::client_dto::{ClientFilters, CreateClientRequest, UpdateClientRequest};
use crate::dto::common_dto::ApiResponse;
use crate::models::client::Client;
use crate::repositories::client_repository::ClientRepository;
use crate::utils::errors::{in_use_error, not_found_error, AppError};
use crate::utils::pagination::{Paginated, Pagination};
use crate::utils::validation::{clean_filter, normalize_phone};

pub struct ClientController {
    repository: ClientRepository,
}

impl ClientController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClientRepository::new(pool),
        }
    }

    pub async fn list(&self, filters: ClientFilters, pagination: Pagination) -> Result<Paginated<Client>, AppError> {
        let (clients, total) = self.repository.list(&filters, pagination).await?;
        Ok(Paginated::new(clients, total, pagination))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Client, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Client", id))
    }

    pub async fn create(&self, request: CreateClientRequest) -> Result<ApiResponse<Client>, AppError> {
        request.validate()?;

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            phone: normalize_phone(&request.phone),
            email: clean_filter(request.email.as_deref()).map(|e| e.to_lowercase()),
            address: clean_filter(request.address.as_deref()),
            city: clean_filter(request.city.as_deref()),
            entreprise_id: request.entreprise_id,
            created_at: now,
            updated_at: now,
        };

        // Una entreprise inexistente la rechaza la FK (400)
        let created = self.repository.create(&client).await?;
        tracing::info!(client_id = %created.id, "🧑 Client creado");

        Ok(ApiResponse::success_with_message(created, "Client creado exitosamente"))
    }

    pub async fn update(&self, id: Uuid, request: UpdateClientRequest) -> Result<ApiResponse<Client>, AppError> {
        request.validate()?;

        let mut client = self.get_by_id(id).await?;

        if let Some(first_name) = request.first_name {
            client.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            client.last_name = last_name.trim().to_string();
        }
        if let Some(phone) = request.phone {
            client.phone = normalize_phone(&phone);
        }
        if request.email.is_some() {
            client.email = clean_filter(request.email.as_deref()).map(|e| e.to_lowercase());
        }
        if request.address.is_some() {
            client.address = clean_filter(request.address.as_deref());
        }
        if request.city.is_some() {
            client.city = clean_filter(request.city.as_deref());
        }
        if request.entreprise_id.is_some() {
            client.entreprise_id = request.entreprise_id;
        }

        let updated = self.repository.update(&client).await?;
        tracing::info!(client_id = %updated.id, "✏️ Client actualizado");

        Ok(ApiResponse::success_with_message(updated, "Client actualizado exitosamente"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(|e| in_use_error(e, "Client"))?;
        if !deleted {
            return Err(not_found_error("Client", id));
        }
        tracing::info!(client_id = %id, "🗑️ Client eliminado");

        Ok(ApiResponse::message("Client eliminado exitosamente"))
    }
}
