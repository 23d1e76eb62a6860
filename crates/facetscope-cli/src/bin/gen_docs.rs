//! Binary that emits command-line options markdown to stdout.
//!
//! Used to refresh `docs/command-line-options.md` whenever the flags change.

fn main() {
    print!("{}", facetscope_cli::render_options_markdown());
}
