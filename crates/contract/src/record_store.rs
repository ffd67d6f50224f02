//! Record store state machine
//!
//! Dispatches on function name plus positional string arguments:
//!
//! | Function | Args | Effect |
//! |----------|------|--------|
//! | `create` | passport, name, family_name, city, address, phone, family_status | writes the record, sets `eventInvoke` |
//! | `read` | passport | returns the current record JSON |
//! | `update` | passport, field, value | rewrites the record with one attribute changed, sets `eventInvoke` |
//! | `history` | passport | returns every version in the compat history format |
//!
//! Every failure is returned as an error [`Response`] carrying the typed
//! error, never as a panic.

use crate::history::read_history;
use crate::operation::Operation;
use idledger_core::{history, Error, HistoryFormat, Record, RecordField, Response, Result};
use idledger_engine::{Contract, TxContext};

/// Event name set by every successful write
pub const COMMIT_EVENT: &str = "eventInvoke";

/// The record store contract
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordContract;

impl RecordContract {
    /// Create the contract
    pub fn new() -> Self {
        RecordContract
    }

    fn dispatch(&self, ctx: &mut TxContext<'_>) -> Result<Vec<u8>> {
        let op: Operation = ctx.function().parse()?;
        let args = ctx.args().to_vec();
        op.check_arity(&args)?;

        match op {
            Operation::Create => self.create(ctx, &args),
            Operation::Read => self.read(ctx, &args[0]),
            Operation::Update => self.update(ctx, &args[0], &args[1], &args[2]),
            Operation::History => self.history(ctx, &args[0]),
        }
    }

    fn create(&self, ctx: &mut TxContext<'_>, args: &[String]) -> Result<Vec<u8>> {
        let record = Record::from_args(Operation::Create.as_str(), args)?;
        if ctx.get_state(&record.passport)?.is_some() {
            return Err(Error::AlreadyExists(record.passport));
        }
        ctx.put_state(&record.passport, record.to_json()?)?;
        ctx.set_event(COMMIT_EVENT, Vec::new())?;
        Ok(Vec::new())
    }

    fn read(&self, ctx: &TxContext<'_>, passport: &str) -> Result<Vec<u8>> {
        ctx.get_state(passport)?
            .ok_or_else(|| Error::NotFound(passport.to_string()))
    }

    fn update(
        &self,
        ctx: &mut TxContext<'_>,
        passport: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<u8>> {
        // The key attribute is refused before touching state; any other
        // unknown name only once the record is known to exist.
        let target = RecordField::resolve(field);
        if let (true, Err(e)) = (RecordField::is_key(field), &target) {
            return Err(e.clone());
        }
        let current = ctx
            .get_state(passport)?
            .ok_or_else(|| Error::NotFound(passport.to_string()))?;
        let target = target?;

        let mut record = Record::from_json(&current)?;
        record.set(target, value);
        ctx.put_state(passport, record.to_json()?)?;
        ctx.set_event(COMMIT_EVENT, Vec::new())?;
        Ok(Vec::new())
    }

    fn history(&self, ctx: &TxContext<'_>, passport: &str) -> Result<Vec<u8>> {
        let entries = read_history(ctx, passport)?;
        history::encode(&entries, HistoryFormat::Compat)
    }
}

impl Contract for RecordContract {
    fn init(&self, _ctx: &mut TxContext<'_>) -> Response {
        Response::success(Vec::new())
    }

    fn invoke(&self, ctx: &mut TxContext<'_>) -> Response {
        let result = self.dispatch(ctx);
        if let Err(e) = &result {
            tracing::debug!(
                tx_id = %ctx.tx_id(),
                function = ctx.function(),
                error = %e,
                "record contract rejected invocation"
            );
        }
        Response::from(result)
    }
}
