//! Subcommand implementations.
//!
//! Each command takes its parsed arguments and returns the text destined for
//! stdout, so the logic can be tested without capturing process output.

use std::fmt::Write as _;
use std::io::Read;

use anyhow::{Context, Result};

use powertx_protocol::codec::{self, Value};
use powertx_protocol::transaction::{SignedTx, TxBody};

use crate::cli::{DecodeArgs, EncodeArgs, InspectArgs};

/// Reads JSON from the input file (or stdin) and returns canonical hex.
pub fn encode(args: &EncodeArgs) -> Result<String> {
    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    encode_json(&raw)
}

/// Converts a JSON document to canonical hex. Binary fields are written as
/// `{"$bin": "<hex>"}`, the form `decode` prints them in.
pub fn encode_json(raw: &str) -> Result<String> {
    let json: serde_json::Value = serde_json::from_str(raw).context("input is not valid JSON")?;
    let value = Value::try_from(json).context("input cannot be represented")?;
    let hex = codec::encode(&value).context("value cannot be encoded")?;
    tracing::info!(hex_len = hex.len(), "encoded input");
    Ok(hex)
}

/// Decodes hex and renders the value as pretty JSON.
pub fn decode(args: &DecodeArgs) -> Result<String> {
    let value = codec::decode(args.hex.trim()).context("failed to decode payload")?;
    serde_json::to_string_pretty(&value).context("failed to render JSON")
}

/// Decodes a body or envelope and renders a field-by-field summary.
pub fn inspect(args: &InspectArgs) -> Result<String> {
    let hex = args.hex.trim();
    let mut out = String::new();

    if args.envelope {
        let tx = SignedTx::from_hex(hex).context("failed to decode signed envelope")?;
        describe_body(&mut out, tx.body())?;
        writeln!(out, "signatures {}", tx.signatures().len())?;
        for (i, sig) in tx.signatures().iter().enumerate() {
            writeln!(
                out,
                "  [{}] pubkey={} sig={}",
                i,
                hex::encode(&sig.public_key),
                hex::encode(&sig.signature)
            )?;
        }
    } else {
        let body = TxBody::from_hex(hex).context("failed to decode transaction body")?;
        describe_body(&mut out, &body)?;
    }

    Ok(out)
}

fn describe_body(out: &mut String, body: &TxBody) -> Result<()> {
    writeln!(out, "kind       {} ({:#04x})", body.kind(), body.kind().code())?;
    writeln!(out, "timestamp  {}", body.timestamp())?;
    writeln!(out, "from       {}", hex::encode(body.sender()))?;
    writeln!(out, "to         {}", hex::encode(body.recipient()))?;
    writeln!(out, "seq        {}", body.seq())?;
    writeln!(out, "purposes   {}", body.purposes().len())?;
    for (i, p) in body.purposes().iter().enumerate() {
        writeln!(out, "  [{}] {} {} {}", i, p.purpose, p.asset, p.amount)?;
    }
    if let Some(e) = body.extension() {
        if let Some(sponsor) = &e.sponsor {
            writeln!(out, "sponsor    {}", hex::encode(sponsor))?;
        }
        if let Some(msg) = &e.msg {
            writeln!(out, "message    {:?}", msg)?;
        }
    }
    if let Some(c) = body.contract_call() {
        writeln!(out, "call       {} ({} arg bytes)", c.method, c.args.len())?;
    }
    if let Some(pa) = body.pa() {
        writeln!(out, "pa         {}", hex::encode(pa))?;
    }
    writeln!(out, "hash       {}", hex::encode(body.hash()?))?;
    Ok(())
}
