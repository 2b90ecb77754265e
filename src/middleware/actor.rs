// src/middleware/actor.rs

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub const ACTOR_HEADER: &str = "x-user-name";
const DEFAULT_ACTOR: &str = "Sistema";

/// Nome gravado no histórico do caso. Não há autenticação: o cliente
/// informa quem está operando pelo cabeçalho `x-user-name`.
pub struct Actor(pub String);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_ACTOR);

        Ok(Actor(name.to_string()))
    }
}
