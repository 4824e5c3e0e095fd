//! Plain XML: <ClosingStatement><movie/><exhibitor/><day/>...<totals/></ClosingStatement>

use std::io::Write;

use quick_xml::se::to_string;
use serde::Serialize;

use crate::{
    error::{LedgerError, Result},
    model::Statement,
};

#[derive(Serialize)]
struct XmlMovie {
    id: String,
    title: String,
}

#[derive(Serialize)]
struct XmlExhibitor {
    id: String,
    name: String,
    location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    gst_number: Option<String>,
}

#[derive(Serialize)]
struct XmlDay {
    date: String,
    status: String,
    shows: u32,
    tickets: u32,
    gross: i64,
    ac_charges: i64,
    net: i64,
}

#[derive(Serialize)]
struct XmlWeek {
    number: u32,
    start: String,
    end: String,
    days: u32,
    net: i64,
    average_per_day: String,
}

#[derive(Serialize)]
struct XmlTotals {
    shows: u64,
    tickets: u64,
    gross: i64,
    ac_charges: i64,
    net: i64,
    distributor_percent: u8,
    distributor_share: i64,
    exhibitor_percent: u8,
    exhibitor_share: i64,
}

#[derive(Serialize)]
#[serde(rename = "ClosingStatement")]
struct XmlStatement {
    number: String,
    start_date: String,
    end_date: String,
    template: String,
    movie: XmlMovie,
    exhibitor: XmlExhibitor,
    day: Vec<XmlDay>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    week: Vec<XmlWeek>,
    totals: XmlTotals,
}

pub struct SimpleXml;

impl crate::traits::WriteFormat for SimpleXml {
    fn write<W: Write>(mut w: W, st: &Statement) -> Result<()> {
        let day = st
            .daily_collections
            .iter()
            .map(|d| XmlDay {
                date: d.date.format("%Y-%m-%d").to_string(),
                status: format!("{:?}", d.status).to_lowercase(),
                shows: d.show_count,
                tickets: d.tickets_sold,
                gross: d.gross_collection,
                ac_charges: d.ac_charges,
                net: d.net_collection,
            })
            .collect();

        let week = st
            .weekly_summaries
            .iter()
            .flatten()
            .map(|w| XmlWeek {
                number: w.week_number,
                start: w.period_start.format("%Y-%m-%d").to_string(),
                end: w.period_end.format("%Y-%m-%d").to_string(),
                days: w.day_count,
                net: w.net_collection,
                average_per_day: w.average_per_day.to_string(),
            })
            .collect();

        let x = XmlStatement {
            number: st.statement_number.clone(),
            start_date: st.start_date.format("%Y-%m-%d").to_string(),
            end_date: st.end_date.format("%Y-%m-%d").to_string(),
            template: st.template.to_string(),
            movie: XmlMovie {
                id: st.movie.id.clone(),
                title: st.movie.title.clone(),
            },
            exhibitor: XmlExhibitor {
                id: st.exhibitor.id.clone(),
                name: st.exhibitor.name.clone(),
                location: st.exhibitor.location.clone(),
                gst_number: st
                    .exhibitor
                    .gst_number
                    .clone()
                    .filter(|_| st.include_gst_details),
            },
            day,
            week,
            totals: XmlTotals {
                shows: st.totals.total_shows,
                tickets: st.totals.total_tickets,
                gross: st.totals.total_gross,
                ac_charges: st.totals.total_ac_charges,
                net: st.totals.total_net,
                distributor_percent: st.share.distributor_percent,
                distributor_share: st.share.distributor_share,
                exhibitor_percent: st.share.exhibitor_percent,
                exhibitor_share: st.share.exhibitor_share,
            },
        };

        let s = to_string(&x).map_err(|e| LedgerError::Xml(format!("{e}")))?;
        w.write_all(s.as_bytes())?;
        Ok(())
    }
}
