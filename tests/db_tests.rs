//! Casos contra Postgres real: `sqlx::test` crea una base por caso,
//! aplica las migraciones y carga `fixtures/base.sql`.

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::{uuid, Uuid};

use colis_backoffice::config::EnvironmentConfig;
use colis_backoffice::controllers::bon_controller::BonController;
use colis_backoffice::controllers::client_controller::ClientController;
use colis_backoffice::controllers::colis_controller::ColisController;
use colis_backoffice::dto::bon_dto::AttachColisRequest;
use colis_backoffice::dto::colis_dto::{
    AssignLivreurRequest, ChangeStatusRequest, ColisFilters, CreateColisRequest,
};
use colis_backoffice::middleware::auth::AuthenticatedUser;
use colis_backoffice::models::colis::ColisScope;
use colis_backoffice::models::user::UserRole;
use colis_backoffice::repositories::statut_repository::StatutRepository;
use colis_backoffice::repositories::user_repository::UserRepository;
use colis_backoffice::services::search_service::SearchService;
use colis_backoffice::services::StatusCatalog;
use colis_backoffice::utils::errors::AppError;
use colis_backoffice::utils::jwt::{generate_token, JwtConfig};
use colis_backoffice::utils::pagination::Pagination;
use colis_backoffice::{create_app, AppState};

const ENTREPRISE_ELAN: Uuid = uuid!("10000000-0000-4000-8000-000000000001");
const ENTREPRISE_MARTIN: Uuid = uuid!("10000000-0000-4000-8000-000000000002");
const CLIENT_HELENE: Uuid = uuid!("20000000-0000-4000-8000-000000000001");
const CLIENT_MARC: Uuid = uuid!("20000000-0000-4000-8000-000000000002");
const LIVREUR_JEROME: Uuid = uuid!("30000000-0000-4000-8000-000000000001");
const LIVREUR_PAUL: Uuid = uuid!("30000000-0000-4000-8000-000000000002");
const USER_ADMIN: Uuid = uuid!("40000000-0000-4000-8000-000000000001");
const USER_GESTION: Uuid = uuid!("40000000-0000-4000-8000-000000000002");
const USER_ELAN: Uuid = uuid!("40000000-0000-4000-8000-000000000003");
const USER_JEROME: Uuid = uuid!("40000000-0000-4000-8000-000000000004");
const USER_INACTIVE: Uuid = uuid!("40000000-0000-4000-8000-000000000005");
const USER_UNLINKED_LIVREUR: Uuid = uuid!("40000000-0000-4000-8000-000000000007");
const BON_OPEN: Uuid = uuid!("50000000-0000-4000-8000-000000000001");
const BON_CLOSED: Uuid = uuid!("50000000-0000-4000-8000-000000000002");
const BON_OTHER_OPEN: Uuid = uuid!("50000000-0000-4000-8000-000000000003");
const COLIS_ON_BON: Uuid = uuid!("60000000-0000-4000-8000-000000000001");
const COLIS_WAITING: Uuid = uuid!("60000000-0000-4000-8000-000000000002");

async fn catalog(pool: &PgPool) -> StatusCatalog {
    StatusCatalog::new(StatutRepository::new(pool.clone()).list_all().await.unwrap())
}

fn staff(role: UserRole, user_id: Uuid) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id,
        role,
        entreprise_id: None,
        livreur_id: None,
    }
}

fn page() -> Pagination {
    Pagination { page: 1, per_page: 50 }
}

async fn history_count(pool: &PgPool, colis_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM colis_history WHERE colis_id = $1")
        .bind(colis_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn bon_of(pool: &PgPool, colis_id: Uuid) -> Option<Uuid> {
    sqlx::query_scalar("SELECT bon_id FROM colis WHERE id = $1")
        .bind(colis_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn server(pool: &PgPool) -> TestServer {
    let state = AppState::with_catalog(pool.clone(), EnvironmentConfig::default(), catalog(pool).await);
    TestServer::new(create_app(state)).unwrap()
}

/// Token firmado para la fila actual del usuario
async fn token_for(pool: &PgPool, user_id: Uuid) -> HeaderValue {
    let user = UserRepository::new(pool.clone()).find_by_id(user_id).await.unwrap().unwrap();
    let token = generate_token(&user, &JwtConfig::from(&EnvironmentConfig::default())).unwrap();
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn search_ignores_accents(pool: PgPool) {
    let catalog = catalog(&pool).await;
    let service = SearchService::new(pool.clone());

    let results = service.search("helene", 5, ColisScope::All, &catalog).await.unwrap();
    assert!(results.clients.iter().any(|hit| hit.id == CLIENT_HELENE));
    assert!(results.colis.iter().any(|hit| hit.id == COLIS_ON_BON));

    let results = service.search("jerome", 5, ColisScope::All, &catalog).await.unwrap();
    assert!(results.livreurs.iter().any(|hit| hit.id == LIVREUR_JEROME));

    let results = service.search("elan", 5, ColisScope::All, &catalog).await.unwrap();
    assert!(results.entreprises.iter().any(|hit| hit.id == ENTREPRISE_ELAN));
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn concurrent_final_status_changes_have_one_winner(pool: PgPool) {
    let catalog = catalog(&pool).await;
    let targets = ["livre", "retourne", "annule"];

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pool = pool.clone();
            let catalog = catalog.clone();
            let request = ChangeStatusRequest {
                status: targets[i % targets.len()].to_string(),
                comment: None,
            };
            tokio::spawn(async move {
                let user = staff(UserRole::Gestionnaire, USER_GESTION);
                ColisController::new(pool)
                    .change_status(&user, COLIS_WAITING, request, &catalog)
                    .await
                    .map(|_| ())
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(AppError::Forbidden(_)) | Err(AppError::Conflict(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(successes, 1);
    // Alta del fixture + el único cambio confirmado
    assert_eq!(history_count(&pool, COLIS_WAITING).await, 2);
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn repeated_status_change_is_a_conflict(pool: PgPool) {
    let catalog = catalog(&pool).await;
    let controller = ColisController::new(pool.clone());
    let user = staff(UserRole::Gestionnaire, USER_GESTION);
    let request = || ChangeStatusRequest {
        status: "en_transit".to_string(),
        comment: Some("Départ du dépôt".to_string()),
    };

    assert!(controller.change_status(&user, COLIS_WAITING, request(), &catalog).await.is_ok());
    let second = controller.change_status(&user, COLIS_WAITING, request(), &catalog).await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
    assert_eq!(history_count(&pool, COLIS_WAITING).await, 2);
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn status_change_notifies_linked_users_but_not_the_actor(pool: PgPool) {
    let catalog = catalog(&pool).await;
    let request = ChangeStatusRequest {
        status: "ramasse".to_string(),
        comment: None,
    };
    ColisController::new(pool.clone())
        .change_status(&staff(UserRole::Admin, USER_ADMIN), COLIS_ON_BON, request, &catalog)
        .await
        .unwrap();

    let mut recipients: Vec<Uuid> =
        sqlx::query_scalar("SELECT user_id FROM notifications WHERE colis_id = $1 AND kind = 'status_change'")
            .bind(COLIS_ON_BON)
            .fetch_all(&pool)
            .await
            .unwrap();
    recipients.sort();

    // Gestionnaire activo, usuario de la entreprise y del livreur; ni el actor ni los inactivos
    assert_eq!(recipients, vec![USER_GESTION, USER_ELAN, USER_JEROME]);
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn colis_creation_records_initial_history(pool: PgPool) {
    let catalog = catalog(&pool).await;
    let request = CreateColisRequest {
        client_id: CLIENT_MARC,
        entreprise_id: None,
        description: None,
        weight_kg: None,
        price: None,
        recipient_name: "  Marc Petit ".to_string(),
        recipient_phone: "0605060708".to_string(),
        delivery_address: "8 quai Perrache".to_string(),
        delivery_city: Some("Lyon".to_string()),
    };

    let created = ColisController::new(pool.clone())
        .create(&staff(UserRole::Gestionnaire, USER_GESTION), request, &catalog)
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(created.status_code, "en_attente");
    assert_eq!(created.entreprise_id, Some(ENTREPRISE_MARTIN));
    assert_eq!(created.recipient_name, "Marc Petit");
    assert_eq!(history_count(&pool, created.id).await, 1);
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn colis_listing_follows_the_user_scope(pool: PgPool) {
    let catalog = catalog(&pool).await;
    let controller = ColisController::new(pool.clone());

    let admin = staff(UserRole::Admin, USER_ADMIN);
    let all = controller.list(&admin, ColisFilters::default(), page(), &catalog).await.unwrap();
    assert_eq!(all.total, 4);

    let entreprise = AuthenticatedUser {
        user_id: USER_ELAN,
        role: UserRole::Entreprise,
        entreprise_id: Some(ENTREPRISE_ELAN),
        livreur_id: None,
    };
    let own = controller.list(&entreprise, ColisFilters::default(), page(), &catalog).await.unwrap();
    assert_eq!(own.total, 2);
    assert!(own.items.iter().all(|colis| colis.entreprise_id == Some(ENTREPRISE_ELAN)));

    let livreur = AuthenticatedUser {
        user_id: USER_JEROME,
        role: UserRole::Livreur,
        entreprise_id: None,
        livreur_id: Some(LIVREUR_JEROME),
    };
    let assigned = controller.list(&livreur, ColisFilters::default(), page(), &catalog).await.unwrap();
    assert_eq!(assigned.total, 1);
    assert_eq!(assigned.items[0].id, COLIS_ON_BON);

    // Colis de otra entreprise: 404, no 403
    let foreign = controller.get_by_id(&entreprise, COLIS_WAITING, &catalog).await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn colis_on_another_open_bon_cannot_be_attached(pool: PgPool) {
    let request = AttachColisRequest {
        colis_ids: vec![COLIS_ON_BON],
    };

    let result = BonController::new(pool.clone()).attach(BON_OTHER_OPEN, request).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(bon_of(&pool, COLIS_ON_BON).await, Some(BON_OPEN));
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn closed_bon_rejects_changes(pool: PgPool) {
    let controller = BonController::new(pool.clone());

    let attach = controller
        .attach(BON_CLOSED, AttachColisRequest { colis_ids: vec![COLIS_WAITING] })
        .await;
    assert!(matches!(attach, Err(AppError::Conflict(_))));
    assert_eq!(bon_of(&pool, COLIS_WAITING).await, None);

    let delete = controller.delete(BON_CLOSED).await;
    assert!(matches!(delete, Err(AppError::Conflict(_))));
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn attach_moves_livreur_with_the_bon(pool: PgPool) {
    let request = AttachColisRequest {
        colis_ids: vec![COLIS_WAITING],
    };

    BonController::new(pool.clone()).attach(BON_OTHER_OPEN, request).await.unwrap();

    let livreur: Option<Uuid> = sqlx::query_scalar("SELECT livreur_id FROM colis WHERE id = $1")
        .bind(COLIS_WAITING)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(bon_of(&pool, COLIS_WAITING).await, Some(BON_OTHER_OPEN));
    assert_eq!(livreur, Some(LIVREUR_PAUL));
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn livreur_cannot_be_reassigned_while_on_a_bon(pool: PgPool) {
    let catalog = catalog(&pool).await;
    let request = AssignLivreurRequest {
        livreur_id: Some(LIVREUR_PAUL),
    };

    let result = ColisController::new(pool.clone())
        .assign_livreur(&staff(UserRole::Admin, USER_ADMIN), COLIS_ON_BON, request, &catalog)
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn client_with_colis_cannot_be_deleted(pool: PgPool) {
    let result = ClientController::new(pool.clone()).delete(CLIENT_HELENE).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn deactivated_user_token_is_rejected(pool: PgPool) {
    let server = server(&pool).await;
    let response = server
        .get("/api/colis")
        .add_header(header::AUTHORIZATION, token_for(&pool, USER_INACTIVE).await)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn role_is_read_from_the_database(pool: PgPool) {
    let server = server(&pool).await;
    let token = token_for(&pool, USER_GESTION).await;

    sqlx::query("UPDATE users SET role = 'livreur' WHERE id = $1")
        .bind(USER_GESTION)
        .execute(&pool)
        .await
        .unwrap();

    let response = server
        .get("/api/clients")
        .add_header(header::AUTHORIZATION, token)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn user_management_is_admin_only(pool: PgPool) {
    let server = server(&pool).await;

    let response = server
        .get("/api/users")
        .add_header(header::AUTHORIZATION, token_for(&pool, USER_GESTION).await)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .get("/api/users")
        .add_header(header::AUTHORIZATION, token_for(&pool, USER_ADMIN).await)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn livreur_cannot_browse_clients(pool: PgPool) {
    let server = server(&pool).await;
    let response = server
        .get("/api/clients")
        .add_header(header::AUTHORIZATION, token_for(&pool, USER_JEROME).await)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn entreprise_cannot_change_status(pool: PgPool) {
    let server = server(&pool).await;
    let response = server
        .post(&format!("/api/colis/{}/status", COLIS_ON_BON))
        .add_header(header::AUTHORIZATION, token_for(&pool, USER_ELAN).await)
        .json(&json!({ "status": "livre" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn entreprise_is_forbidden_on_bon_list_and_detail(pool: PgPool) {
    let server = server(&pool).await;
    let token = token_for(&pool, USER_ELAN).await;

    let list = server
        .get("/api/bons")
        .add_header(header::AUTHORIZATION, token.clone())
        .await;
    assert_eq!(list.status_code(), StatusCode::FORBIDDEN);

    let detail = server
        .get(&format!("/api/bons/{}", BON_OPEN))
        .add_header(header::AUTHORIZATION, token)
        .await;
    assert_eq!(detail.status_code(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn unlinked_livreur_gets_empty_bon_page(pool: PgPool) {
    let server = server(&pool).await;
    let response = server
        .get("/api/bons")
        .add_header(header::AUTHORIZATION, token_for(&pool, USER_UNLINKED_LIVREUR).await)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["total"], 0);
    assert_eq!(body["items"], json!([]));
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn search_requires_two_characters(pool: PgPool) {
    let server = server(&pool).await;
    let response = server
        .get("/api/search")
        .add_query_param("q", " a ")
        .add_header(header::AUTHORIZATION, token_for(&pool, USER_ADMIN).await)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn search_endpoint_matches_accented_names(pool: PgPool) {
    let server = server(&pool).await;
    let response = server
        .get("/api/search")
        .add_query_param("q", "Helene")
        .add_header(header::AUTHORIZATION, token_for(&pool, USER_ADMIN).await)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["clients"][0]["id"], json!(CLIENT_HELENE));
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn malformed_page_uses_json_envelope(pool: PgPool) {
    let server = server(&pool).await;
    let response = server
        .get("/api/colis")
        .add_query_param("page", "abc")
        .add_header(header::AUTHORIZATION, token_for(&pool, USER_ADMIN).await)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn statut_creation_validates_color(pool: PgPool) {
    let server = server(&pool).await;
    let response = server
        .post("/api/statuts")
        .add_header(header::AUTHORIZATION, token_for(&pool, USER_ADMIN).await)
        .json(&json!({ "code": "en_pause", "label": "En pause", "color": "blue" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations", fixtures(path = "fixtures", scripts("base")))]
async fn authenticated_users_read_the_status_catalog(pool: PgPool) {
    let server = server(&pool).await;
    let response = server
        .get("/api/statuts")
        .add_header(header::AUTHORIZATION, token_for(&pool, USER_JEROME).await)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 8);
    assert_eq!(body[0]["code"], "en_attente");
}
