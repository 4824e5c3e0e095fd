//! Pretty-printed JSON of the whole statement.

use std::io::Write;

use crate::{error::Result, model::Statement};

pub struct Json;

impl crate::traits::WriteFormat for Json {
    fn write<W: Write>(mut w: W, st: &Statement) -> Result<()> {
        serde_json::to_writer_pretty(&mut w, st)?;
        w.write_all(b"\n")?;
        Ok(())
    }
}
