//! Printing results as text or JSON.

use anyhow::Result;
use serde::Serialize;

use park_core::{
    BreakdownKind, LifecycleFlags, ParkError, ParkEventRecord, RatingTuple, RideId, RideStatus,
    World,
};

use crate::session::StatusOutcome;

#[derive(Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Summary,
    /// JSON document on stdout
    Json,
}

/// One ride as it stands after the command.
#[derive(Serialize)]
pub struct RideReport {
    pub name: String,
    pub id: u16,
    pub status: RideStatus,
    pub tested: bool,
    pub ratings: Option<RatingTuple>,
    pub value: Option<u16>,
    pub reliability: u8,
    pub breakdown: Option<BreakdownKind>,
}

#[derive(Serialize)]
pub struct StatusReport {
    pub ride: String,
    pub target: RideStatus,
    pub accepted: bool,
    pub error_code: Option<&'static str>,
    pub message: Option<String>,
    pub tile: Option<String>,
}

impl From<&StatusOutcome> for StatusReport {
    fn from(outcome: &StatusOutcome) -> Self {
        let error = outcome.result.as_ref().err();
        Self {
            ride: outcome.ride.clone(),
            target: outcome.target,
            accepted: error.is_none(),
            error_code: error.map(|error| error.error_code()),
            message: error.map(ToString::to_string),
            tile: error.and_then(|error| error.tile()).map(|tile| tile.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct Report {
    pub scenario: String,
    pub tick: u64,
    pub statuses: Vec<StatusReport>,
    pub rides: Vec<RideReport>,
    pub events: Vec<ParkEventRecord>,
}

impl Report {
    pub fn new(
        scenario: &str,
        world: &World,
        names: &[(String, RideId)],
        statuses: &[StatusOutcome],
        events: Vec<ParkEventRecord>,
    ) -> Self {
        let rides = names
            .iter()
            .filter_map(|(name, id)| {
                let ride = world.rides.get(*id)?;
                Some(RideReport {
                    name: name.clone(),
                    id: id.0,
                    status: ride.status,
                    tested: ride.lifecycle_flags.contains(LifecycleFlags::TESTED),
                    ratings: (!ride.ratings.is_null()).then_some(ride.ratings),
                    value: ride.value,
                    reliability: ride.reliability.percentage(),
                    breakdown: ride.reliability.breakdown_reason,
                })
            })
            .collect();

        Self {
            scenario: scenario.to_string(),
            tick: world.tick().0,
            statuses: statuses.iter().map(StatusReport::from).collect(),
            rides,
            events,
        }
    }

    pub fn print(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(self)?),
            OutputFormat::Summary => self.print_summary(),
        }
        Ok(())
    }

    fn print_summary(&self) {
        println!("Scenario '{}' at tick {}", self.scenario, self.tick);

        if !self.statuses.is_empty() {
            println!();
            println!("Status requests:");
            for status in &self.statuses {
                let target = status.target.to_string();
                match (&status.message, &status.tile) {
                    (None, _) => println!("  {:<20} -> {:<8} ok", status.ride, target),
                    (Some(message), Some(tile)) => println!(
                        "  {:<20} -> {:<8} {} at {}",
                        status.ride, target, message, tile
                    ),
                    (Some(message), None) => {
                        println!("  {:<20} -> {:<8} {}", status.ride, target, message)
                    }
                }
            }
        }

        println!();
        println!(
            "{:<20} {:<12} {:>6} {:>6} {:>6} {:>6} {:>5}",
            "Ride", "Status", "Excite", "Inten", "Nausea", "Value", "Rel%"
        );
        for ride in &self.rides {
            let (excitement, intensity, nausea) = match ride.ratings {
                Some(ratings) => (
                    format_rating(ratings.excitement),
                    format_rating(ratings.intensity),
                    format_rating(ratings.nausea),
                ),
                None => ("-".into(), "-".into(), "-".into()),
            };
            let value = ride
                .value
                .map(|value| value.to_string())
                .unwrap_or_else(|| "-".into());
            println!(
                "{:<20} {:<12} {:>6} {:>6} {:>6} {:>6} {:>5}",
                ride.name,
                ride.status.to_string(),
                excitement,
                intensity,
                nausea,
                value,
                ride.reliability
            );
            if let Some(kind) = ride.breakdown {
                println!("{:<20} broken down: {}", "", kind);
            }
        }

        if !self.events.is_empty() {
            println!();
            println!("Events ({}):", self.events.len());
            for record in &self.events {
                println!("  [{:>6}] {:?}", record.tick.0, record.event);
            }
        }
    }
}

/// Ratings are stored in hundredths.
fn format_rating(rating: i16) -> String {
    format!("{}.{:02}", rating / 100, rating % 100)
}
