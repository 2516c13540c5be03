//! Trait definitions for query builders.

use crate::client::Transport;
use crate::error::{NqError, NqResult};
use crate::qb::binding::BindingList;
use crate::result::QueryResult;
use crate::runner::QueryRunner;
use crate::value::Scalar;
use serde::Serialize;

/// Base trait for all statement builders.
///
/// A builder renders to two forms that describe the same operation:
/// the structured payload for the `/tables/*` endpoints ([`SqlQb::to_payload`])
/// and SQL text for `/query` ([`SqlQb::to_sql`]).
pub trait SqlQb: Sync {
    /// Structured request body for the matching REST endpoint.
    type Payload: Serialize;

    /// Target table.
    fn table_name(&self) -> &str;

    /// First error recorded while chaining builder calls, if any.
    fn build_error(&self) -> Option<&str>;

    /// Render SQL text, appending every bound value to `out` in text order.
    ///
    /// Returns `""` when the builder has nothing to execute or carries a
    /// [`SqlQb::build_error`].
    fn render(&self, out: &mut BindingList) -> String;

    /// Build the structured payload.
    fn to_payload(&self) -> Self::Payload;

    /// Validate builder state before execution.
    fn validate(&self) -> NqResult<()>;

    /// SQL text with values inlined as literals.
    fn to_sql(&self) -> String {
        self.render(&mut BindingList::inline())
    }

    /// Values in the order they appear in [`SqlQb::to_sql`].
    fn bindings(&self) -> Vec<Scalar> {
        let mut out = BindingList::inline();
        self.render(&mut out);
        out.into_vec()
    }

    /// SQL text with `$1, $2, ...` placeholders, plus the values they stand for.
    fn to_parameterized_sql(&self) -> (String, Vec<Scalar>) {
        let mut out = BindingList::numbered();
        let sql = self.render(&mut out);
        (sql, out.into_vec())
    }

    /// The payload as a JSON value.
    ///
    /// Fails with [`NqError::Validation`] when the builder carries a build error.
    fn to_array(&self) -> NqResult<serde_json::Value> {
        if let Some(err) = self.build_error() {
            return Err(NqError::validation(err));
        }
        Ok(serde_json::to_value(self.to_payload())?)
    }

    /// Validate, render and run the SQL text through `/query`.
    fn execute<T: Transport>(
        &self,
        runner: &QueryRunner<T>,
    ) -> impl std::future::Future<Output = NqResult<QueryResult>> + Send {
        async move {
            self.validate()?;
            let mut out = BindingList::inline();
            let sql = self.render(&mut out);
            runner.execute_bound(&sql, out.as_slice()).await
        }
    }
}
