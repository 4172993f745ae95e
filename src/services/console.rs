//! Terminal front end for one session. Each input line is parsed as a
//! command, run against the pages, and answered with the re-rendered view.

use clap::{Parser, Subcommand};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::admin::{AdminPages, SavedPackage};
use super::auth::AuthPage;
use super::gate::{self, Page};
use super::generator::ImageGeneratorPage;
use super::purchases::BuyCreditsPage;
use super::{PageError, ServiceError, Session};
use crate::models::{
    generation::{AspectRatio, STYLE_PRESETS},
    packages::CreditPackage,
    storefront::{PaymentDetails, PaymentDetailsUpdate},
    users::NewUser,
};

#[derive(Parser)]
#[command(name = "promptforge", no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Go to a page path, e.g. `open /buy-credits`.
    Open { path: String },
    /// List the pages this session can reach.
    Pages,
    Login { email: String, password: String },
    Signup {
        name: String,
        email: String,
        password: String,
    },
    Logout,
    /// List the credit packages on sale.
    Packages,
    /// Submit a payment request for a package.
    Buy {
        package_id: String,
        transaction_id: String,
    },
    /// Set the generation prompt.
    Prompt {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Set the negative prompt. Without text the negative prompt is cleared.
    Negative {
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Choose an aspect ratio: 1:1, 16:9, 9:16, 4:3 or 3:4.
    Ratio { ratio: AspectRatio },
    /// Prepend a style preset to the prompt.
    Style {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Generate an image for one credit.
    Generate,
    /// Remove an image from the gallery.
    Discard { id: String },
    Stats,
    Users,
    /// Add or remove credits, e.g. `credits <user-id> -50`.
    Credits {
        user_id: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Block or unblock a user.
    Toggle { user_id: String },
    /// List pending payment requests.
    Payments,
    Approve { payment_id: String },
    Reject { payment_id: String },
    /// Show or change the payment details.
    PaymentDetails {
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        account: Option<String>,
    },
    /// Replace the payment QR code reference.
    Qr { reference: String },
    /// Add a package, or update the one with `--id`.
    Package {
        #[arg(long)]
        id: Option<String>,
        name: String,
        credits: u64,
        price: f64,
    },
    DeletePackage { id: String },
    /// Print the full session state as JSON.
    Snapshot,
    Quit,
}

pub enum Reply {
    Output(String),
    Quit,
}

pub struct Console {
    session: Session,
    auth: AuthPage,
    purchases: BuyCreditsPage,
    admin: AdminPages,
    generator: ImageGeneratorPage,
    location: &'static str,
}

impl Console {
    pub fn new(session: Session) -> Self {
        Self {
            auth: AuthPage::new(&session),
            purchases: BuyCreditsPage::new(&session),
            admin: AdminPages::new(&session),
            generator: ImageGeneratorPage::new(&session),
            session,
            location: Page::Auth.path(),
        }
    }

    pub fn location(&self) -> &str {
        self.location
    }

    pub async fn execute(&mut self, line: &str) -> Reply {
        let tokens = match split_line(line) {
            Ok(tokens) if tokens.is_empty() => return Reply::Output(String::new()),
            Ok(tokens) => tokens,
            Err(message) => return Reply::Output(format!("error: {}", message)),
        };
        let command = match Line::try_parse_from(tokens) {
            Ok(line) => line.command,
            Err(e) => return Reply::Output(e.to_string().trim_end().to_string()),
        };
        if let Command::Quit = command {
            return Reply::Quit;
        }

        match self.run(command).await {
            Ok(output) => Reply::Output(output),
            Err(PageError::InsufficientCredits) => {
                let mut output = format!("error: {}", PageError::InsufficientCredits);
                if let Ok(page) = self.navigate(Page::BuyCredits.path()).await {
                    output.push('\n');
                    output.push_str(&page);
                }
                Reply::Output(output)
            }
            Err(e) => Reply::Output(format!("error: {}", e)),
        }
    }

    async fn run(&mut self, command: Command) -> Result<String, PageError> {
        match command {
            Command::Open { path } => self.navigate(&path).await,
            Command::Pages => {
                let state = self.session.store.snapshot().await?;
                let pages: Vec<String> = gate::navigation(&state)
                    .iter()
                    .map(|page| format!("  {:<22} {}", page.path(), page.title()))
                    .collect();
                Ok(pages.join("\n"))
            }
            Command::Login { email, password } => {
                let user = self.auth.login(&email, &password).await?;
                let greeting = format!("Welcome back, {}!", user.name);
                self.after(greeting, "/").await
            }
            Command::Signup {
                name,
                email,
                password,
            } => {
                let user = self
                    .auth
                    .signup(NewUser {
                        name,
                        email,
                        password,
                    })
                    .await?;
                let greeting = format!(
                    "Welcome, {}! You have received {} free credits.",
                    user.name, user.credits
                );
                self.after(greeting, "/").await
            }
            Command::Logout => {
                self.auth.logout().await?;
                self.generator = ImageGeneratorPage::new(&self.session);
                self.after("Logged out.".to_string(), Page::Auth.path())
                    .await
            }
            Command::Packages => {
                let packages = self.purchases.packages().await?;
                Ok(render_packages(&packages))
            }
            Command::Buy {
                package_id,
                transaction_id,
            } => {
                self.purchases
                    .submit_payment(&package_id, &transaction_id)
                    .await?;
                Ok("Payment request submitted! Please wait for admin approval.".to_string())
            }
            Command::Prompt { text } => {
                self.require(Page::ImageGenerator).await?;
                self.generator.set_prompt(&text.join(" "));
                self.show(Page::ImageGenerator).await
            }
            Command::Negative { text } => {
                self.require(Page::ImageGenerator).await?;
                self.generator.set_negative_prompt(&text.join(" "));
                self.show(Page::ImageGenerator).await
            }
            Command::Ratio { ratio } => {
                self.require(Page::ImageGenerator).await?;
                self.generator.set_aspect_ratio(ratio);
                self.show(Page::ImageGenerator).await
            }
            Command::Style { name } => {
                let name = name.join(" ");
                let style = STYLE_PRESETS
                    .iter()
                    .find(|preset| preset.eq_ignore_ascii_case(&name))
                    .ok_or(PageError::UnknownStyle(name.clone()))?;
                self.require(Page::ImageGenerator).await?;
                self.generator.apply_style(style);
                self.show(Page::ImageGenerator).await
            }
            Command::Generate => {
                let image = self.generator.generate().await?;
                let page = self.show(Page::ImageGenerator).await?;
                Ok(format!(
                    "Image generated successfully! ({})\n{}",
                    image.id, page
                ))
            }
            Command::Discard { id } => {
                if !self.generator.delete_image(&id) {
                    return Ok(format!("No image {} in the gallery.", id));
                }
                self.show(Page::ImageGenerator).await
            }
            Command::Stats => self.show(Page::AdminDashboard).await,
            Command::Users => self.show(Page::UserManagement).await,
            Command::Credits { user_id, amount } => {
                let user = self.admin.adjust_credits(&user_id, amount).await?;
                let direction = if amount > 0 { "added to" } else { "removed from" };
                Ok(format!(
                    "{} credits {} {}. Balance: {}.",
                    amount.unsigned_abs(),
                    direction,
                    user.name,
                    user.credits
                ))
            }
            Command::Toggle { user_id } => {
                let user = self.admin.toggle_status(&user_id).await?;
                Ok(format!(
                    "User status updated. {} is now {}.",
                    user.name,
                    user.status.as_str()
                ))
            }
            Command::Payments => self.show(Page::PaymentVerification).await,
            Command::Approve { payment_id } => {
                let (payment, credits) = self.admin.approve(&payment_id).await?;
                Ok(format!(
                    "Payment approved and credits added! {} received {} credits.",
                    payment.user_email, credits
                ))
            }
            Command::Reject { payment_id } => {
                self.admin.reject(&payment_id).await?;
                Ok("Payment has been rejected.".to_string())
            }
            Command::PaymentDetails { method, account } => {
                if method.is_none() && account.is_none() {
                    let details = self.admin.payment_details().await?;
                    return Ok(render_payment_details(&details));
                }
                let details = self
                    .admin
                    .update_payment_details(PaymentDetailsUpdate {
                        method_name: method,
                        account_number: account,
                        qr_code_url: None,
                    })
                    .await?;
                Ok(format!(
                    "Payment details updated!\n{}",
                    render_payment_details(&details)
                ))
            }
            Command::Qr { reference } => {
                self.admin.upload_qr_code(&reference).await?;
                Ok("QR Code updated!".to_string())
            }
            Command::Package {
                id,
                name,
                credits,
                price,
            } => {
                let id = id.unwrap_or_else(|| CreditPackage::draft().id);
                let package = CreditPackage {
                    id,
                    name,
                    credits,
                    price,
                };
                let verb = match self.admin.save_package(package.clone()).await? {
                    SavedPackage::Added => "added",
                    SavedPackage::Updated => "updated",
                };
                Ok(format!("Package \"{}\" {} ({}).", package.name, verb, package.id))
            }
            Command::DeletePackage { id } => {
                self.admin.delete_package(&id).await?;
                Ok("Package deleted.".to_string())
            }
            Command::Snapshot => {
                let state = self.session.store.snapshot().await?;
                serde_json::to_string_pretty(&state)
                    .map_err(|e| PageError::Service(ServiceError::Internal(e.to_string())))
            }
            Command::Quit => Ok(String::new()),
        }
    }

    async fn require(&self, page: Page) -> Result<(), PageError> {
        let state = self.session.store.snapshot().await?;
        gate::require(&state, page)
    }

    async fn show(&mut self, page: Page) -> Result<String, PageError> {
        self.require(page).await?;
        self.navigate(page.path()).await
    }

    async fn after(&mut self, message: String, path: &str) -> Result<String, PageError> {
        let page = self.navigate(path).await?;
        Ok(format!("{}\n{}", message, page))
    }

    async fn navigate(&mut self, path: &str) -> Result<String, PageError> {
        let state = self.session.store.snapshot().await?;
        let page = gate::resolve(&state, path);
        self.location = page.path();

        let mut out = format!("== {} ==\n", page.title());
        if let Some(user) = &state.current_user {
            if user.is_admin() {
                out.push_str(&format!("{} (Administrator)\n", user.name));
            } else {
                out.push_str(&format!("{} | Credits: {}\n", user.name, user.credits));
            }
        }
        out.push_str(&self.render(page).await?);
        Ok(out)
    }

    async fn render(&self, page: Page) -> Result<String, PageError> {
        let body = match page {
            Page::Auth => [
                "Log in:  login <email> <password>",
                "Sign up: signup <name> <email> <password>",
            ]
            .join("\n"),
            Page::ImageGenerator => self.render_generator(),
            Page::BuyCredits => {
                let packages = self.purchases.packages().await?;
                let details = self.purchases.payment_details().await?;
                format!(
                    "{}\n{}\nBuy with: buy <package-id> <transaction-id>",
                    render_packages(&packages),
                    render_payment_details(&details)
                )
            }
            Page::AdminDashboard => {
                let stats = self.admin.dashboard().await?;
                format!(
                    "Total users:       {}\nPending approvals: {}\nSession revenue:   ৳{}",
                    stats.total_users, stats.pending_approvals, stats.session_revenue
                )
            }
            Page::UserManagement => {
                let users = self.admin.users().await?;
                if users.is_empty() {
                    "No users have signed up yet.".to_string()
                } else {
                    users
                        .iter()
                        .map(|u| {
                            format!(
                                "  {}  {:<16} {:<28} {:>6} cr  {}",
                                u.id,
                                u.name,
                                u.email,
                                u.credits,
                                u.status.as_str()
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Page::PaymentVerification => {
                let payments = self.admin.pending_payments().await?;
                if payments.is_empty() {
                    "No pending payment requests.".to_string()
                } else {
                    payments
                        .iter()
                        .map(|p| {
                            format!(
                                "  {}  {:<28} {:<16} ৳{:<8} trx {}  {}",
                                p.id,
                                p.user_email,
                                p.package_name,
                                p.package_price,
                                p.transaction_id,
                                p.created_at.format("%Y-%m-%d %H:%M")
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Page::Settings => {
                let details = self.admin.payment_details().await?;
                let packages = self.admin.packages().await?;
                format!(
                    "{}\n{}",
                    render_payment_details(&details),
                    render_packages(&packages)
                )
            }
        };
        Ok(body)
    }

    fn render_generator(&self) -> String {
        let draft = self.generator.draft();
        let ratios: Vec<&str> = AspectRatio::ALL.iter().map(|r| r.as_str()).collect();
        let mut lines = vec![
            format!("Prompt:          {}", draft.prompt),
            format!("Negative prompt: {}", draft.negative_prompt),
            format!("Aspect ratio:    {} (of {})", draft.aspect_ratio, ratios.join(", ")),
            format!("Styles:          {}", STYLE_PRESETS.join(", ")),
            format!("Gallery:         {} image(s)", self.generator.gallery().len()),
        ];
        for image in self.generator.gallery() {
            lines.push(format!(
                "  {}  {}  -> {}",
                image.id,
                image.prompt,
                image.download_file_name()
            ));
        }
        lines.join("\n")
    }
}

fn render_packages(packages: &[CreditPackage]) -> String {
    if packages.is_empty() {
        return "No credit packages available.".to_string();
    }
    packages
        .iter()
        .map(|p| format!("  {:<12} {:<16} {:>6} Credits  ৳{}", p.id, p.name, p.credits, p.price))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_payment_details(details: &PaymentDetails) -> String {
    format!(
        "Pay with {}: {}\nQR code: {}",
        details.method_name, details.account_number, details.qr_code_url
    )
}

/// Splits on whitespace, keeping single- or double-quoted runs together.
fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unterminated quote.".to_string());
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

pub async fn run(session: Session) -> Result<(), anyhow::Error> {
    let mut console = Console::new(session);
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();

    if let Reply::Output(intro) = console.execute("open /").await {
        stdout.write_all(format!("{}\n", intro).as_bytes()).await?;
    }

    loop {
        stdout
            .write_all(format!("{}> ", console.location()).as_bytes())
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match console.execute(&line).await {
            Reply::Output(output) if output.is_empty() => {}
            Reply::Output(output) => {
                stdout.write_all(format!("{}\n", output).as_bytes()).await?;
            }
            Reply::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_line_keeps_quoted_runs() {
        let tokens = split_line(r#"signup "Ada Lovelace" ada@example.com 'pass word'"#).unwrap();
        assert_eq!(
            tokens,
            ["signup", "Ada Lovelace", "ada@example.com", "pass word"]
        );
    }

    #[test]
    fn split_line_handles_empty_quotes_and_blank_lines() {
        assert_eq!(split_line(r#"buy pkg1 """#).unwrap(), ["buy", "pkg1", ""]);
        assert!(split_line("   ").unwrap().is_empty());
        assert!(split_line("prompt \"open").is_err());
    }

    #[test]
    fn commands_parse_negative_amounts() {
        let line = Line::try_parse_from(["credits", "u-1", "-50"]).unwrap();
        match line.command {
            Command::Credits { user_id, amount } => {
                assert_eq!(user_id, "u-1");
                assert_eq!(amount, -50);
            }
            _ => panic!("expected credits command"),
        }
    }

    #[test]
    fn ratio_command_rejects_unknown_ratios() {
        assert!(Line::try_parse_from(["ratio", "16:9"]).is_ok());
        assert!(Line::try_parse_from(["ratio", "2:1"]).is_err());
    }
}
