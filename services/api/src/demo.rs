use crate::infra::{parse_deadline_arg, LandingServices};
use chrono::{DateTime, Utc};
use clap::Args;
use std::sync::Arc;
use wdc_labs::config::AppConfig;
use wdc_labs::countdown::{CountdownClock, SystemTimeSource};
use wdc_labs::error::AppError;
use wdc_labs::sponsorship::{SponsorshipDetails, SponsorshipRequest};
use wdc_labs::telemetry;
use wdc_labs::waitlist::{ApplicationFields, SubmitOutcome};

#[derive(Args, Debug)]
pub(crate) struct CountdownArgs {
    /// Deadline (RFC 3339 or YYYY-MM-DDTHH:MM:SS, UTC). Defaults to COUNTDOWN_DEADLINE.
    #[arg(long, value_parser = parse_deadline_arg)]
    pub(crate) deadline: Option<DateTime<Utc>>,
    /// Number of ticks to print after the initial value.
    #[arg(long, default_value_t = 5)]
    pub(crate) ticks: u32,
}

#[derive(Args, Debug)]
pub(crate) struct WaitlistArgs {
    #[arg(long)]
    pub(crate) first_name: String,
    #[arg(long)]
    pub(crate) last_name: String,
    #[arg(long)]
    pub(crate) email: String,
    /// WhatsApp number, any format
    #[arg(long)]
    pub(crate) whatsapp: String,
    /// LinkedIn profile URL
    #[arg(long)]
    pub(crate) linkedin: String,
}

#[derive(Args, Debug)]
pub(crate) struct SponsorArgs {
    /// Plan the sponsor is asked to pay for
    #[arg(long)]
    pub(crate) plan: Option<String>,
    #[arg(long)]
    pub(crate) your_name: String,
    #[arg(long)]
    pub(crate) your_email: String,
    #[arg(long)]
    pub(crate) sponsor_name: String,
    #[arg(long)]
    pub(crate) sponsor_email: String,
    /// Optional personal note included in the e-mail body
    #[arg(long)]
    pub(crate) message: Option<String>,
}

pub(crate) async fn run_countdown(args: CountdownArgs) -> Result<(), AppError> {
    let deadline = match args.deadline {
        Some(deadline) => deadline,
        None => AppConfig::load()?.landing.countdown_deadline,
    };

    let (mut clock, mut ticks) = CountdownClock::new(Arc::new(SystemTimeSource));
    clock.start(deadline);
    println!("Countdown to {deadline}");

    for _ in 0..=args.ticks {
        let Some(breakdown) = ticks.recv().await else {
            break;
        };
        println!(
            "  {:>3} days {:02} hours {:02} mins {:02} secs",
            breakdown.days, breakdown.hours, breakdown.minutes, breakdown.seconds
        );
        if breakdown.is_expired() {
            println!("  Deadline reached.");
            break;
        }
    }

    clock.stop();
    Ok(())
}

pub(crate) async fn run_waitlist(args: WaitlistArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let services = LandingServices::from_config(&config)?;
    let controller = services.controller();

    let WaitlistArgs {
        first_name,
        last_name,
        email,
        whatsapp,
        linkedin,
    } = args;
    controller
        .fill(ApplicationFields {
            first_name,
            last_name,
            email,
            whatsapp_number: whatsapp,
            linkedin_url: linkedin,
        })?;

    println!("Application for the {} list", controller.collection());
    match controller.submit().await {
        SubmitOutcome::Succeeded => {
            println!("- Success! You've been added to the waitlist.");
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            println!("- Please fix: {}", errors.names().join(", "));
            Ok(())
        }
        SubmitOutcome::Failed(err) => {
            println!("- Failed to join waitlist. Please try again.");
            Err(err.into())
        }
        SubmitOutcome::Ignored | SubmitOutcome::Cancelled => Ok(()),
    }
}

pub(crate) fn run_sponsor(args: SponsorArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let SponsorArgs {
        plan,
        your_name,
        your_email,
        sponsor_name,
        sponsor_email,
        message,
    } = args;

    let mut request =
        SponsorshipRequest::with_base_url(config.landing.sponsor_base_url, plan.as_deref());
    request.set_details(SponsorshipDetails {
        your_name,
        your_email,
        sponsor_name,
        sponsor_email,
        message,
    });

    let link = request.generate_link()?;
    let draft = request.email_draft();

    println!("Sponsorship request for {}", request.plan());
    println!("- Link: {link}");
    println!("- To: {}", draft.to);
    println!("- Subject: {}", draft.subject);
    println!("- Mail client: {}", draft.mailto_url());
    Ok(())
}
