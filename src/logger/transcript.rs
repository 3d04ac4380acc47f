// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev
//
// Port of `Logger.py`'s PlantUML sequence-diagram transcript: a
// `@startuml`/`skin rose` header naming participants CLT and SVR, one line
// per exchanged or dropped APDU, and an `@enduml` trailer on shutdown.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use chrono::Utc;

pub struct Transcript {
    file: BufWriter<File>,
}

impl Transcript {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("failed to create transcript file {:?}", path.as_ref()))?;
        let mut file = BufWriter::new(file);
        writeln!(file, "@startuml")?;
        writeln!(file, "skin rose")?;
        writeln!(file, "title GBT example ({})", Utc::now().to_rfc3339())?;
        writeln!(file, "participant CLT as \"Client\"")?;
        writeln!(file, "participant SVR as \"Server\"")?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.file, "{text}")?;
        Ok(())
    }

    pub fn close(mut self) -> Result<()> {
        writeln!(self.file, "@enduml")?;
        self.file.flush()?;
        Ok(())
    }
}
