use crate::infra::{booking_service, load_directory, parse_date, InMemoryLedger};
use chrono::{Local, NaiveDate};
use clap::Args;
use passport_appointment::config::AppConfig;
use passport_appointment::error::AppError;
use passport_appointment::workflows::appointment::{
    AppointmentType, CivilStatus, ContactInput, FixedClock, Gender, LocationInput, LookupOutcome,
    LookupQuery, LookupTracker, ModalKind, PersonalInput, ScheduleInput, SchedulePolicy,
    SessionView, StartSessionRequest, StepInput, TimeSlot, NOT_FOUND_MESSAGE,
};
use std::sync::Arc;

const UPCOMING_DATES_SHOWN: usize = 5;

#[derive(Args, Debug, Default)]
pub(crate) struct LocationsArgs {
    /// Region to list countries for (e.g. "ASIA PACIFIC")
    #[arg(long)]
    pub(crate) region: Option<String>,
    /// Country to list offices for; requires --region
    #[arg(long, requires = "region")]
    pub(crate) country: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SlotsArgs {
    /// Date to check (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Override the current date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct LookupArgs {
    /// Reference code printed on the confirmation (try "demo")
    #[arg(long)]
    pub(crate) code: String,
    /// Email address used for the booking
    #[arg(long)]
    pub(crate) email: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the current date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Office key to book; defaults to the first office in the directory
    #[arg(long)]
    pub(crate) site: Option<String>,
    /// Book a group appointment instead of an individual one
    #[arg(long)]
    pub(crate) group: bool,
    /// Skip the view-appointment lookup at the end of the demo
    #[arg(long)]
    pub(crate) skip_lookup: bool,
}

pub(crate) fn run_locations(args: LocationsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let directory = load_directory(&config.booking)?;

    match (args.region, args.country) {
        (Some(region), Some(country)) => {
            let offices = directory.offices(&region, &country);
            if offices.is_empty() {
                println!("No offices listed under {region} / {country}");
                return Ok(());
            }
            println!("Offices in {region} / {country}");
            for listing in offices {
                println!("- {}", listing.key);
                println!("    {}", listing.office.address);
                if let Some(contact) = &listing.office.contact_number {
                    println!("    Contact: {contact}");
                }
                if let Some(map) = &listing.office.map_reference {
                    println!("    Map: {map}");
                }
            }
        }
        (Some(region), None) => {
            let countries = directory.sub_regions(&region);
            if countries.is_empty() {
                println!("No countries listed under {region}");
            } else {
                println!("Countries in {region}");
                for country in countries {
                    println!("- {country}");
                }
            }
        }
        _ => {
            println!("Regions ({} offices total)", directory.office_count());
            for region in directory.regions() {
                println!("- {region}");
            }
        }
    }

    Ok(())
}

pub(crate) fn run_slots(args: SlotsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let policy = SchedulePolicy::new(config.booking.horizon_days);
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("Time slots");
    for slot in policy.time_slots() {
        println!("- {}", slot.label());
    }

    match args.date {
        Some(date) => {
            let verdict = if policy.is_selectable(date, today) {
                "available"
            } else {
                "not available"
            };
            println!(
                "\n{} is {verdict} (bookable {today} through {}, weekdays only)",
                date.format("%A %Y-%m-%d"),
                policy.last_bookable(today)
            );
        }
        None => {
            println!("\nNext bookable dates from {today}");
            for date in policy
                .selectable_dates(today)
                .into_iter()
                .take(UPCOMING_DATES_SHOWN)
            {
                println!("- {}", date.format("%A %Y-%m-%d"));
            }
        }
    }

    Ok(())
}

pub(crate) async fn run_lookup(args: LookupArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let tracker = LookupTracker::new(
        Arc::new(InMemoryLedger::default()),
        config.booking.lookup_latency,
    );

    match tracker.lookup(LookupQuery::new(args.code, args.email)).await {
        Ok(outcome) => print_lookup(&outcome),
        Err(error) => println!("{error}"),
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let (service, ledger) = booking_service(&config.booking, Arc::new(FixedClock(today)))?;

    let appointment_type = if args.group {
        AppointmentType::Group
    } else {
        AppointmentType::Individual
    };

    println!("Passport appointment demo");
    println!(
        "Today: {today}  Booking window: {} days  Reference prefix: {}",
        config.booking.horizon_days, config.booking.reference_prefix
    );

    let view = service.start_session(StartSessionRequest {
        appointment_type,
        accepted_terms: true,
    })?;
    let id = view.session_id.clone();
    println!(
        "\nTerms accepted; {} appointment session {} opened",
        appointment_type.label(),
        id
    );

    let view = service.open_modal(&id, ModalKind::Requirements)?;
    if let Some(kind) = view.active_modal {
        println!("Showing overlay: {}", kind.label());
    }
    service.close_modal(&id)?;

    let location = demo_location(&service, args.site);
    // With no bookable weekday in the window the schedule step rejects today's date.
    let date = service
        .policy()
        .selectable_dates(today)
        .into_iter()
        .next()
        .unwrap_or(today);

    let inputs = vec![
        StepInput::Location(location),
        StepInput::Schedule(ScheduleInput {
            date: Some(date),
            time_slot: TimeSlot::TenAm.label().to_string(),
        }),
        StepInput::Personal(PersonalInput {
            first_name: "Juan".to_string(),
            middle_name: Some("Santos".to_string()),
            last_name: "Dela Cruz".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15),
            gender: Some(Gender::Male),
            civil_status: Some(CivilStatus::Single),
            birth_place: "Quezon City".to_string(),
        }),
        StepInput::Contact(ContactInput {
            mobile_number: "+63 917 555 0101".to_string(),
            email: "juan.delacruz@example.ph".to_string(),
            confirm_email: "juan.delacruz@example.ph".to_string(),
            address: "12 Mabini Street".to_string(),
            city: "Quezon City".to_string(),
            province: "Metro Manila".to_string(),
            zip_code: Some("1100".to_string()),
        }),
    ];

    println!();
    for input in inputs {
        let submitted = input.step();
        let view = service.submit_step(&id, input)?;
        println!(
            "Step {} of {} ({}) complete; now at {} [{}%]",
            submitted.number(),
            view.step.total,
            submitted.label(),
            view.step.label,
            view.progress_percent
        );
    }

    let review = service.session(&id)?;
    render_review(&review);

    let confirmed = service.submit_step(&id, StepInput::Review)?;
    let Some(code) = confirmed.reference_code.clone() else {
        println!("\nBooking was not confirmed");
        return Ok(());
    };
    println!("\nAppointment confirmed");
    println!("  Reference code: {code}");
    if let Some(email) = &confirmed.confirmation_email {
        println!("  Confirmation sent to: {email}");
    }
    println!("  Bookings recorded this run: {}", ledger.len());

    if !args.skip_lookup {
        let email = confirmed.confirmation_email.unwrap_or_default();
        println!("\nLooking up {code} ...");
        let outcome = service.lookup(&id, LookupQuery::new(code, email)).await?;
        print_lookup(&outcome);
    }

    service.end_session(&id)?;
    Ok(())
}

fn demo_location(
    service: &crate::infra::BookingService,
    site: Option<String>,
) -> LocationInput {
    let directory = service.directory();
    for region in directory.regions() {
        for country in directory.sub_regions(region) {
            let offices = directory.offices(region, country);
            let chosen = match &site {
                Some(site) => offices.iter().find(|listing| listing.key == site),
                None => offices.first(),
            };
            if let Some(listing) = chosen {
                return LocationInput {
                    region: region.to_string(),
                    country: country.to_string(),
                    site: listing.key.to_string(),
                };
            }
        }
    }

    // Unknown office: the location step rejects it.
    LocationInput {
        region: directory
            .regions()
            .first()
            .map(|region| region.to_string())
            .unwrap_or_default(),
        country: String::new(),
        site: site.unwrap_or_default(),
    }
}

fn render_review(view: &SessionView) {
    println!("\nReview & Confirm");
    let draft = &view.draft;
    if let Some(location) = &draft.location {
        println!("  Office: {} ({} / {})", location.site, location.region, location.country);
    }
    if let Some(schedule) = &draft.schedule {
        println!(
            "  When: {} at {}",
            schedule.date.format("%A, %B %-d, %Y"),
            schedule.time_slot.label()
        );
    }
    if let Some(personal) = &draft.personal {
        println!("  Applicant: {}", personal.formal_name());
        println!(
            "  Born: {} in {} ({}, {})",
            personal.birth_date,
            personal.birth_place,
            personal.gender.label(),
            personal.civil_status.label()
        );
    }
    if let Some(contact) = &draft.contact {
        println!("  Mobile: {}", contact.mobile_number);
        println!("  Email: {}", contact.email);
        println!("  Address: {}", contact.mailing_address());
    }
}

fn print_lookup(outcome: &LookupOutcome) {
    match outcome {
        LookupOutcome::Found(summary) => {
            println!("Appointment {}", summary.code);
            println!("  Name: {}", summary.name);
            println!("  Type: {}", summary.appointment_type);
            println!("  Site: {}", summary.site);
            println!("  Date: {} {}", summary.date, summary.time);
            println!("  Status: {}", summary.status.label());
        }
        LookupOutcome::NotFound => println!("{NOT_FOUND_MESSAGE}"),
        LookupOutcome::Superseded => println!("Lookup was replaced by a newer request"),
    }
}
