/// Walks the `source` chain of an error, printing every layer. Used to implement `Debug` for our
/// error enums so that logs (e.g. from `TracingLogger`) show the root cause and not just the top
/// level message.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
