use clap::Subcommand;

use taskweave_core::GoogleCalendar;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Google Calendar: login / logout / status
    Google {
        #[command(subcommand)]
        action: AuthOp,
    },
}

#[derive(Subcommand)]
pub enum AuthOp {
    /// Run the browser OAuth flow
    Login {
        /// OAuth client ID (stored in the OS keyring)
        #[arg(long)]
        client_id: Option<String>,
        /// OAuth client secret (stored in the OS keyring)
        #[arg(long)]
        client_secret: Option<String>,
    },
    /// Remove stored credentials
    Logout,
    /// Check authentication status
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Google { action } => match action {
            AuthOp::Login {
                client_id,
                client_secret,
            } => {
                if let (Some(id), Some(secret)) = (client_id, client_secret) {
                    GoogleCalendar::set_credentials(&id, &secret)?;
                }
                let google = GoogleCalendar::new();
                google.authenticate()?;
                println!("Google Calendar authenticated");
            }
            AuthOp::Logout => {
                GoogleCalendar::new().disconnect()?;
                println!("Google Calendar credentials removed");
            }
            AuthOp::Status => {
                let status = if GoogleCalendar::new().is_authenticated() {
                    "authenticated"
                } else {
                    "not authenticated"
                };
                println!("google: {status}");
            }
        },
    }
    Ok(())
}
