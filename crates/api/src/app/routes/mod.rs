use axum::{Router, routing::get};

use storeops_sales::{CompetitorSale, Sale};
use storeops_team::{Task, TeamMember};

pub mod analytics;
pub mod orders;
pub mod products;
pub mod records;
pub mod system;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .route("/stream", get(system::stream))
        .nest("/products", products::router())
        .nest("/sales", records::router::<Sale>(true))
        .nest("/competitor-sales", records::router::<CompetitorSale>(true))
        .nest("/orders", orders::router())
        .nest("/team", records::router::<TeamMember>(false))
        .nest("/tasks", records::router::<Task>(false))
        .nest("/analytics", analytics::router())
}
