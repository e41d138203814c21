//! Statement interruption driven by a caller's `Context`

use certledger_core::Context;
use rusqlite::Connection;

/// Interrupts statements on `conn` once the context is done.
///
/// Installs a SQLite progress handler that runs every `ops` virtual machine
/// instructions; the handler is removed when the guard drops, so it never
/// outlives the store call that installed it.
pub(crate) struct CancelGuard<'c> {
    conn: &'c Connection,
}

impl<'c> CancelGuard<'c> {
    pub(crate) fn install(conn: &'c Connection, ctx: &Context, ops: i32) -> Self {
        let ctx = ctx.clone();
        conn.progress_handler(ops, Some(move || ctx.is_done()));
        Self { conn }
    }
}

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}
