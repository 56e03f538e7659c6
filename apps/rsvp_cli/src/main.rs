use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    labels::{friend_label, step_action_label},
    resolve_base_url, DayPhase, RsvpClient, RsvpForm,
};
use shared::domain::{Day, GuestEntry, GuestField, MAX_GUESTS_PER_DAY};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Submit an RSVP for one morning session.
#[derive(Parser, Debug)]
struct Args {
    /// Relay base URL. Defaults to `RSVP_API_URL`, then the production
    /// deployment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    day: Day,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    about: String,
    /// A friend as `Name:about`. Repeat for up to four friends.
    #[arg(long = "friend", value_parser = parse_friend)]
    friends: Vec<GuestEntry>,
}

fn parse_friend(raw: &str) -> Result<GuestEntry, String> {
    let (name, about) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name:about', got '{raw}'"))?;
    Ok(GuestEntry {
        name: name.trim().to_string(),
        about: about.trim().to_string(),
        ..GuestEntry::default()
    })
}

impl Args {
    fn entries(&self) -> Vec<GuestEntry> {
        let primary = GuestEntry {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            about: self.about.clone(),
        };
        std::iter::once(primary)
            .chain(self.friends.iter().cloned())
            .collect()
    }
}

fn relay_client(server_url: Option<&str>) -> RsvpClient {
    match server_url {
        Some(url) => RsvpClient::new(resolve_base_url(Some(url))),
        None => RsvpClient::from_env(),
    }
}

fn fill_form(form: &mut RsvpForm, day: Day, entries: &[GuestEntry]) -> Result<()> {
    if entries.len() > MAX_GUESTS_PER_DAY {
        bail!("at most {MAX_GUESTS_PER_DAY} guests per day, got {}", entries.len());
    }
    form.set_guest_count(day, entries.len())?;

    for (step, entry) in entries.iter().enumerate() {
        for field in GuestField::ALL {
            form.update_field(day, step, field, entry.field(field))?;
        }
        debug!(
            %day,
            step,
            action = step_action_label(step, entries.len(), false),
            "guest filled"
        );

        let is_last = step + 1 == entries.len();
        let passed = if is_last {
            form.validate_step(day, step)
        } else {
            form.advance(day)
        };
        if !passed {
            let who = match step {
                0 => "your details".to_string(),
                n => friend_label(n, entries.len()),
            };
            let failing = form
                .day(day)
                .errors(step)
                .map(|errors| errors.failing())
                .unwrap_or_default()
                .into_iter()
                .map(|field| format!("{field:?}").to_lowercase())
                .collect::<Vec<_>>();
            bail!("{who}: missing or invalid {}", failing.join(", "));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let args = Args::parse();

    let client = relay_client(args.server_url.as_deref());
    debug!(base_url = %client.base_url(), "using RSVP relay");
    let mut form = RsvpForm::new();
    fill_form(&mut form, args.day, &args.entries())?;

    match form.submit(args.day, &client).await? {
        DayPhase::Submitted => {
            if let Some(confirmation) = form.confirmation() {
                println!(
                    "Thanks {}! See you {}.",
                    confirmation.first_name, confirmation.day_text
                );
            }
            Ok(())
        }
        _ => bail!(
            "{}",
            form.submission_error()
                .unwrap_or(client_core::GENERIC_SUBMISSION_ERROR)
        ),
    }
}
