//! Plain-text rendering of a plan.

use itinerary_core::{LookupOutcome, Plan};
use std::fmt::Write;

const RULE: &str = "------------------------------";

/// Render the request summary, agent activity, warnings and itinerary.
pub fn render(plan: &Plan, agent: &str) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, plan, agent);
    out
}

fn write_report(out: &mut String, plan: &Plan, agent: &str) -> std::fmt::Result {
    let request = &plan.request;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Generating Itinerary Recommendations for:")?;
    writeln!(out, "   Duration: {} days", request.duration)?;
    writeln!(out, "   Month: {}", request.month.label())?;
    writeln!(out, "   Interests: {}", request.interests.join(", "))?;
    writeln!(out, "{RULE}")?;

    if !plan.lookups.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            " Knowledge agent ({agent}): researched {} interest(s)",
            plan.lookups.len()
        )?;
        for lookup in &plan.lookups {
            match &lookup.outcome {
                LookupOutcome::Found { name, region } => {
                    writeln!(out, "  - {}: found {name} in {region}", lookup.interest)?
                }
                LookupOutcome::NotFound => {
                    writeln!(out, "  - {}: no location found", lookup.interest)?
                }
                LookupOutcome::Failed { error } => {
                    writeln!(out, "  - {}: lookup failed ({error})", lookup.interest)?
                }
            }
        }
    }

    writeln!(out)?;
    writeln!(out, " Warnings:")?;
    if plan.warnings.is_empty() {
        writeln!(out, "  - No conflicts found. Plan looks good!")?;
    } else {
        for warning in &plan.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        " Recommended Itinerary ({} of up to {} stops):",
        plan.itinerary.len(),
        plan.max_stops
    )?;
    if plan.itinerary.is_empty() {
        writeln!(
            out,
            "   - No itinerary items could be generated for these preferences."
        )?;
    } else {
        for item in &plan.itinerary {
            writeln!(
                out,
                "   {}. {:<15} | {}",
                item.stop_number, item.location, item.reason
            )?;
            if !item.description.is_empty() {
                writeln!(out, "      {}", item.description)?;
            }
        }
    }
    writeln!(out, "{RULE}")
}
