// Rich text editing: markdown styling, markdown export and list continuation

pub mod emitter;
pub mod list_continuation;
pub mod markdown_ast;
pub mod markdown_parser;
pub mod session;
pub mod style;
pub mod styled_buffer;
pub mod styler;

pub use emitter::to_markdown;
pub use list_continuation::{Continuation, on_line_break};
pub use session::EditingSession;
pub use style::{DEFAULT_BASE_SIZE, StyleAttributes};
pub use styled_buffer::{BufferError, Run, StyledTextBuffer};
pub use styler::{MatchMode, StyleReport, StylerConfig, apply_styles, markdown_to_buffer};
