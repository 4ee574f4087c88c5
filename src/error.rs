use salvo::async_trait;
use salvo::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("error serializing session data")]
    Serde(#[from] serde_json::Error),

    #[error("quote could not be found")]
    NotFound,

    #[error("request context is missing application state")]
    State,
}

#[async_trait]
impl Writer for AppError {
    async fn write(mut self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        match self {
            Self::NotFound => {
                res.status_code(StatusCode::NOT_FOUND);
            }
            _ => {
                tracing::error!(err = ?self, "an error occurred when handling request");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }
}
