//! Print view of a statement; layout follows the statement's template.

use std::io::Write;

use rust_decimal::Decimal;

use crate::{
    error::Result,
    model::{DayStatus, Statement, TemplateFormat},
    money::{format_date, format_day_month, format_inr, format_inr_decimal},
};

const RULE: &str = "------------------------------------------------------------------------";

pub struct Text;

fn header<W: Write>(w: &mut W, st: &Statement) -> Result<()> {
    writeln!(w, "PICTURE CLOSING STATEMENT")?;
    writeln!(w, "Statement No: {}", st.statement_number)?;
    writeln!(w, "{RULE}")?;
    writeln!(w, "Movie:     {} ({})", st.movie.title, st.movie.id)?;
    writeln!(w, "Exhibitor: {}", st.exhibitor.name)?;
    writeln!(w, "Location:  {}", st.exhibitor.location)?;
    if st.include_gst_details {
        if let Some(gst) = &st.exhibitor.gst_number {
            writeln!(w, "GSTIN:     {gst}")?;
        }
    }
    writeln!(
        w,
        "Period:    {} to {}",
        format_date(st.start_date),
        format_date(st.end_date)
    )?;
    writeln!(w, "{RULE}")?;
    Ok(())
}

fn daily<W: Write>(w: &mut W, st: &Statement, with_shows: bool) -> Result<()> {
    writeln!(w, "DAY-WISE COLLECTIONS")?;
    if with_shows {
        writeln!(
            w,
            "{:<12} {:<10} {:>5} {:>8} {:>14} {:>10} {:>14}",
            "Date", "Day", "Shows", "Tickets", "Gross", "AC", "Net"
        )?;
    } else {
        writeln!(
            w,
            "{:<12} {:<10} {:>8} {:>14} {:>10} {:>14}",
            "Date", "Day", "Tickets", "Gross", "AC", "Net"
        )?;
    }
    for d in &st.daily_collections {
        let date = format_date(d.date);
        let day = d.day_name();
        let note = match d.status {
            DayStatus::Reported => "",
            DayStatus::Synthesized => " *",
            DayStatus::Missing => " (missing)",
        };
        if with_shows {
            writeln!(
                w,
                "{:<12} {:<10} {:>5} {:>8} {:>14} {:>10} {:>14}{note}",
                date,
                day,
                d.show_count,
                d.tickets_sold,
                format_inr(d.gross_collection),
                format_inr(d.ac_charges),
                format_inr(d.net_collection)
            )?;
        } else {
            writeln!(
                w,
                "{:<12} {:<10} {:>8} {:>14} {:>10} {:>14}{note}",
                date,
                day,
                d.tickets_sold,
                format_inr(d.gross_collection),
                format_inr(d.ac_charges),
                format_inr(d.net_collection)
            )?;
        }
    }
    if st
        .daily_collections
        .iter()
        .any(|d| d.status == DayStatus::Synthesized)
    {
        writeln!(w, "* synthesized demo figures")?;
    }
    writeln!(w, "{RULE}")?;
    Ok(())
}

fn weekly<W: Write>(w: &mut W, st: &Statement) -> Result<()> {
    let Some(weeks) = &st.weekly_summaries else {
        return Ok(());
    };
    writeln!(w, "WEEKLY SUMMARY")?;
    writeln!(
        w,
        "{:<6} {:<18} {:>14} {:>14}",
        "Week", "Period", "Net", "Avg/Day"
    )?;
    for wk in weeks {
        let period = format!(
            "{} - {}",
            format_day_month(wk.period_start),
            format_day_month(wk.period_end)
        );
        writeln!(
            w,
            "{:<6} {:<18} {:>14} {:>14}",
            format!("W{}", wk.week_number),
            period,
            format_inr(wk.net_collection),
            format_inr_decimal(wk.average_per_day)
        )?;
    }
    writeln!(w, "{RULE}")?;
    Ok(())
}

fn totals<W: Write>(w: &mut W, st: &Statement) -> Result<()> {
    let t = &st.totals;
    writeln!(w, "TOTALS")?;
    writeln!(w, "{:<28} {:>16}", "Total Tickets", t.total_tickets)?;
    writeln!(w, "{:<28} {:>16}", "Gross Collection", format_inr(t.total_gross))?;
    writeln!(w, "{:<28} {:>16}", "Less: AC Charges", format_inr(t.total_ac_charges))?;
    writeln!(w, "{:<28} {:>16}", "Net Collection", format_inr(t.total_net))?;
    writeln!(w, "{RULE}")?;
    writeln!(w, "REVENUE SHARE")?;
    writeln!(
        w,
        "{:<28} {:>16}",
        format!("Distributor Share ({}%)", st.share.distributor_percent),
        format_inr(st.share.distributor_share)
    )?;
    writeln!(
        w,
        "{:<28} {:>16}",
        format!("Exhibitor Share ({}%)", st.share.exhibitor_percent),
        format_inr(st.share.exhibitor_share)
    )?;
    writeln!(w, "{RULE}")?;
    Ok(())
}

fn performance<W: Write>(w: &mut W, st: &Statement) -> Result<()> {
    let reported: Vec<_> = st
        .daily_collections
        .iter()
        .filter(|d| d.status != DayStatus::Missing)
        .collect();
    writeln!(w, "PERFORMANCE")?;
    let days = format!("{}/{}", reported.len(), st.day_count());
    writeln!(w, "{:<28} {:>16}", "Days Reported", days)?;
    if !reported.is_empty() {
        let avg = Decimal::from(st.totals.total_net) / Decimal::from(reported.len());
        writeln!(w, "{:<28} {:>16}", "Average Net per Day", format_inr_decimal(avg))?;
    }
    let best = reported
        .iter()
        .max_by_key(|d| (d.net_collection, std::cmp::Reverse(d.date)));
    if let Some(best) = best {
        writeln!(
            w,
            "{:<28} {:>16}",
            format!("Best Day ({})", format_day_month(best.date)),
            format_inr(best.net_collection)
        )?;
    }
    writeln!(w, "{RULE}")?;
    Ok(())
}

impl crate::traits::WriteFormat for Text {
    fn write<W: Write>(mut w: W, st: &Statement) -> Result<()> {
        header(&mut w, st)?;
        match st.template {
            TemplateFormat::Standard => {
                daily(&mut w, st, false)?;
                weekly(&mut w, st)?;
            }
            TemplateFormat::Detailed => daily(&mut w, st, true)?,
            TemplateFormat::Summary => weekly(&mut w, st)?,
            TemplateFormat::Producer => performance(&mut w, st)?,
        }
        totals(&mut w, st)?;
        Ok(())
    }
}
