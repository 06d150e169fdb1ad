//! Cell-by-cell resolution for pipe-delimited tables

use super::expressions::ResolveError;
use super::resolver::Resolver;

/// Resolve placeholders in a pipe-delimited table, cell by cell.
///
/// The first physical line is the header row; it carries column names, not
/// data, and passes through untouched. The remaining content splits on `|`
/// and every fragment resolves independently with textual coercion, so the
/// row/column framing survives byte-for-byte. Splitting on `|` rather than
/// on line breaks lets a placeholder whose body wraps across a row boundary
/// (tables wrap long cell values) resolve as one unit.
pub fn resolve_table(resolver: &Resolver, table: &str) -> Result<String, ResolveError> {
    let Some((header, rows)) = table.split_once('\n') else {
        // Header-only table: nothing to resolve
        return Ok(table.to_string());
    };
    let mut cells = Vec::new();
    for fragment in rows.split('|') {
        cells.push(resolver.resolve_to_string(fragment)?);
    }
    Ok(format!("{}\n{}", header, cells.join("|")))
}
