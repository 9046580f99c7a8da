//! Session commands: register, login, logout, status.

use clap::Subcommand;
use secrecy::SecretString;

use ethpay_core::{Email, UserRole};
use ethpay_gateway::ApiError;
use ethpay_gateway::auth::Registration;

use super::{CliContext, CliError};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create a new gateway account
    Register {
        /// Full name
        #[arg(short = 'n', long)]
        full_name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Phone number
        #[arg(long)]
        phone: String,

        /// Password (or set ETHPAY_PASSWORD)
        #[arg(short, long, env = "ETHPAY_PASSWORD", hide_env_values = true)]
        password: String,

        /// Account role (`endUser` or `merchant`)
        #[arg(short, long, default_value = "endUser")]
        role: String,

        /// Company name (required for merchants)
        #[arg(short, long, default_value = "")]
        company: String,
    },
    /// Log in and persist the session
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (or set ETHPAY_PASSWORD)
        #[arg(short, long, env = "ETHPAY_PASSWORD", hide_env_values = true)]
        password: String,

        /// Company name (merchant logins)
        #[arg(short, long)]
        company: Option<String>,
    },
    /// Log out and clear the local session
    Logout,
    /// Show the cached session
    Status,
}

pub async fn run(ctx: &CliContext, action: AuthAction) -> Result<(), CliError> {
    match action {
        AuthAction::Register {
            full_name,
            email,
            phone,
            password,
            role,
            company,
        } => {
            let email = Email::parse(&email)
                .map_err(|e| CliError::Api(ApiError::Validation(e.to_string())))?;
            let role: UserRole = role.parse().map_err(CliError::InvalidInput)?;

            let user = ctx
                .auth
                .register(&Registration {
                    full_name,
                    email,
                    phone_number: phone,
                    password,
                    role,
                    company_name: company,
                })
                .await?;

            tracing::info!("Registered {} ({})", user.email, user.full_name);
            tracing::info!("Log in with: ethpay auth login -e {}", user.email);
        }
        AuthAction::Login {
            email,
            password,
            company,
        } => {
            let profile = ctx
                .auth
                .login(&email, &SecretString::from(password), company.as_deref())
                .await?;
            tracing::info!("Logged in as {} ({})", profile.full_name, profile.role);
        }
        AuthAction::Logout => {
            ctx.auth.logout().await?;
            tracing::info!("Logged out");
        }
        AuthAction::Status => match ctx.session.profile() {
            Some(profile) if ctx.session.is_authenticated() => {
                tracing::info!("Logged in as {} <{}>", profile.full_name, profile.email);
                tracing::info!("  Role: {}", profile.role);
                tracing::info!("  User ID: {}", profile.user_id);
            }
            _ => tracing::info!("Not logged in"),
        },
    }
    Ok(())
}
