//! Simple REST API server example for the ledger bank.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `POST /clients` - Register a client
//! - `POST /clients/{document}/accounts` - Open an account for a client
//! - `POST /transactions` - Run a deposit or withdrawal
//! - `GET /accounts` - List account summaries
//! - `GET /accounts/{number}` - Get one account summary
//! - `GET /accounts/{number}/statement?kind=&date=` - List recorded transactions
//!
//! ## Example Usage
//!
//! ```bash
//! # Register a client and open an account
//! curl -X POST http://localhost:3000/clients \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Maria Silva", "birth_date": "15/03/1985", "document": "123.456.789-01", "address": "Rua das Flores, 123"}'
//! curl -X POST http://localhost:3000/clients/12345678901/accounts
//!
//! # Deposit
//! curl -X POST http://localhost:3000/transactions \
//!   -H "Content-Type: application/json" \
//!   -d '{"type": "deposit", "document": "12345678901", "account": 1, "amount": "100.00"}'
//!
//! # Today's withdrawals
//! curl "http://localhost:3000/accounts/1/statement?kind=withdrawal&date=15/03/2025"
//! ```

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use ledger_bank::{
    AccountNumber, AccountSummary, Bank, Client, DocumentNumber, Transaction, TransactionError,
    TransactionKind, TransactionRecord,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

// === Request/Response DTOs ===

/// Request body for registering clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientRequest {
    pub name: String,
    /// `dd/mm/yyyy`
    pub birth_date: String,
    pub document: String,
    pub address: String,
}

/// Request body for transactions.
///
/// ```json
/// {"type": "deposit", "document": "12345678901", "account": 1, "amount": "100.00"}
/// ```
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionRequest {
    Deposit {
        document: String,
        account: u32,
        amount: Decimal,
    },
    Withdrawal {
        document: String,
        account: u32,
        amount: Decimal,
    },
}

impl TransactionRequest {
    /// Splits the request into owner, account and transaction.
    fn into_parts(self) -> Result<(DocumentNumber, AccountNumber, Transaction), TransactionError> {
        let (document, account, transaction) = match self {
            Self::Deposit {
                document,
                account,
                amount,
            } => (document, account, Transaction::deposit(amount)),
            Self::Withdrawal {
                document,
                account,
                amount,
            } => (document, account, Transaction::withdrawal(amount)),
        };
        Ok((
            DocumentNumber::new(&document)?,
            AccountNumber(account),
            transaction,
        ))
    }
}

/// Query string of the statement endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct StatementQuery {
    pub kind: Option<String>,
    /// `dd/mm/yyyy`
    pub date: Option<String>,
}

/// Response body for errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the bank.
#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<Bank>,
}

// === Error Handling ===

/// Wrapper for converting `TransactionError` into HTTP responses.
pub struct AppError(TransactionError);

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            TransactionError::InvalidAmount => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            TransactionError::InsufficientFunds => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_FUNDS")
            }
            TransactionError::LimitExceeded { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "LIMIT_EXCEEDED")
            }
            TransactionError::WithdrawalCountExceeded { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "WITHDRAWAL_COUNT_EXCEEDED")
            }
            TransactionError::DailyLimitReached { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "DAILY_LIMIT_REACHED")
            }
            TransactionError::DuplicateClient => (StatusCode::CONFLICT, "DUPLICATE_CLIENT"),
            TransactionError::ClientNotFound => (StatusCode::NOT_FOUND, "CLIENT_NOT_FOUND"),
            TransactionError::AccountNotFound => (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND"),
            TransactionError::ClientMismatch => (StatusCode::FORBIDDEN, "CLIENT_MISMATCH"),
            TransactionError::InvalidDocument => (StatusCode::BAD_REQUEST, "INVALID_DOCUMENT"),
            TransactionError::InvalidDate => (StatusCode::BAD_REQUEST, "INVALID_DATE"),
            TransactionError::UnknownKind(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_KIND"),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /clients - Register a client.
async fn register_client(
    State(state): State<AppState>,
    Json(request): Json<ClientRequest>,
) -> Result<StatusCode, AppError> {
    let client = Client::new(
        request.name,
        Client::parse_date(&request.birth_date)?,
        DocumentNumber::new(&request.document)?,
        request.address,
    );
    state.bank.register_client(client)?;
    Ok(StatusCode::CREATED)
}

/// POST /clients/{document}/accounts - Open an account.
async fn open_account(
    State(state): State<AppState>,
    Path(document): Path<String>,
) -> Result<(StatusCode, Json<AccountSummary>), AppError> {
    let document = DocumentNumber::new(&document)?;
    let account = state.bank.open_account(&document)?;
    Ok((StatusCode::CREATED, Json(account.summary())))
}

/// POST /transactions - Run a transaction.
async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<TransactionRequest>,
) -> Result<StatusCode, AppError> {
    let (document, number, transaction) = request.into_parts()?;
    state.bank.execute(&document, number, transaction)?;
    Ok(StatusCode::CREATED)
}

/// GET /accounts/{number} - Get an account summary.
async fn get_account(
    State(state): State<AppState>,
    Path(number): Path<u32>,
) -> Result<Json<AccountSummary>, AppError> {
    let account = state
        .bank
        .get_account(AccountNumber(number))
        .ok_or(TransactionError::AccountNotFound)?;
    Ok(Json(account.summary()))
}

/// GET /accounts - List account summaries.
async fn list_accounts(State(state): State<AppState>) -> Json<Vec<AccountSummary>> {
    Json(state.bank.summaries().collect())
}

/// GET /accounts/{number}/statement - List recorded transactions.
async fn statement(
    State(state): State<AppState>,
    Path(number): Path<u32>,
    Query(query): Query<StatementQuery>,
) -> Result<Json<Vec<TransactionRecord>>, AppError> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<TransactionKind>)
        .transpose()?;
    let date: Option<NaiveDate> = query
        .date
        .as_deref()
        .map(Client::parse_date)
        .transpose()?;
    let records = state.bank.statement(AccountNumber(number), kind, date)?;
    Ok(Json(records))
}

// === Router ===

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/clients", post(register_client))
        .route("/clients/{document}/accounts", post(open_account))
        .route("/transactions", post(create_transaction))
        .route("/accounts", get(list_accounts))
        .route("/accounts/{number}", get(get_account))
        .route("/accounts/{number}/statement", get(statement))
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let state = AppState {
        bank: Arc::new(Bank::new()),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
    println!("Ledger bank API server running on http://127.0.0.1:3000");
    println!();
    println!("Endpoints:");
    println!("  POST /clients                        - Register a client");
    println!("  POST /clients/:document/accounts     - Open an account");
    println!("  POST /transactions                   - Run a transaction");
    println!("  GET  /accounts                       - List all accounts");
    println!("  GET  /accounts/:number               - Get account by number");
    println!("  GET  /accounts/:number/statement     - Get account statement");

    axum::serve(listener, app).await.unwrap();
}
