/*
 * from_now.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `jtemplate from-now`: print the timestamp a `$fromNow` expression
//! resolves to right now.

use anyhow::Result;

use jtemplate_core::{Clock, SystemClock, from_now};

pub fn execute(expression: &str) -> Result<()> {
    let timestamp = from_now::resolve(expression, SystemClock.now())?;
    println!("{timestamp}");
    Ok(())
}
