use std::collections::HashSet;

/// Element kinds understood by the compiler.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `div`
    Div,
    /// `section`
    Section,
    /// `header`
    Header,
    /// `footer`
    Footer,
    /// `main`
    Main,
    /// `article`
    Article,
    /// `nav`
    Nav,
    /// `aside`
    Aside,
    /// `ul`
    Ul,
    /// `ol`
    Ol,
    /// `li`
    Li,
    /// `span`
    Span,
    /// `p`
    P,
    /// `h1`..`h6`, carrying the level.
    Heading(u8),
    /// `strong`
    Strong,
    /// `b`
    B,
    /// `em`
    Em,
    /// `i`
    I,
    /// `u`
    U,
    /// `s`
    S,
    /// `code`
    Code,
    /// `pre`
    Pre,
    /// `small`
    Small,
    /// `mark`
    Mark,
    /// `blockquote`
    Blockquote,
    /// `img`
    Img,
    /// `br`
    Br,
    /// A kind registered as an engine extension.
    Extension(String),
}

/// Which IR node an element kind compiles into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeCategory {
    /// Block-level grouping.
    Container,
    /// Inline text holder; collapses into a text node when all children are text.
    Text,
    /// Image leaf.
    Image,
    /// Line break, compiled into a newline text node.
    LineBreak,
    /// Extension node.
    Extension,
}

impl ElementKind {
    /// Parse a tag name. Names in `extensions` map to [`ElementKind::Extension`].
    pub fn from_tag(tag: &str, extensions: &HashSet<String>) -> Option<Self> {
        let kind = match tag {
            "div" => Self::Div,
            "section" => Self::Section,
            "header" => Self::Header,
            "footer" => Self::Footer,
            "main" => Self::Main,
            "article" => Self::Article,
            "nav" => Self::Nav,
            "aside" => Self::Aside,
            "ul" => Self::Ul,
            "ol" => Self::Ol,
            "li" => Self::Li,
            "span" => Self::Span,
            "p" => Self::P,
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "strong" => Self::Strong,
            "b" => Self::B,
            "em" => Self::Em,
            "i" => Self::I,
            "u" => Self::U,
            "s" => Self::S,
            "code" => Self::Code,
            "pre" => Self::Pre,
            "small" => Self::Small,
            "mark" => Self::Mark,
            "blockquote" => Self::Blockquote,
            "img" => Self::Img,
            "br" => Self::Br,
            other if extensions.contains(other) => Self::Extension(other.to_string()),
            _ => return None,
        };
        Some(kind)
    }

    /// Tag name as written in source.
    pub fn tag(&self) -> &str {
        match self {
            Self::Div => "div",
            Self::Section => "section",
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Main => "main",
            Self::Article => "article",
            Self::Nav => "nav",
            Self::Aside => "aside",
            Self::Ul => "ul",
            Self::Ol => "ol",
            Self::Li => "li",
            Self::Span => "span",
            Self::P => "p",
            Self::Heading(1) => "h1",
            Self::Heading(2) => "h2",
            Self::Heading(3) => "h3",
            Self::Heading(4) => "h4",
            Self::Heading(5) => "h5",
            Self::Heading(_) => "h6",
            Self::Strong => "strong",
            Self::B => "b",
            Self::Em => "em",
            Self::I => "i",
            Self::U => "u",
            Self::S => "s",
            Self::Code => "code",
            Self::Pre => "pre",
            Self::Small => "small",
            Self::Mark => "mark",
            Self::Blockquote => "blockquote",
            Self::Img => "img",
            Self::Br => "br",
            Self::Extension(name) => name,
        }
    }

    /// IR category for this kind.
    pub fn category(&self) -> NodeCategory {
        match self {
            Self::Div
            | Self::Section
            | Self::Header
            | Self::Footer
            | Self::Main
            | Self::Article
            | Self::Nav
            | Self::Aside
            | Self::Ul
            | Self::Ol
            | Self::Li
            | Self::Blockquote => NodeCategory::Container,
            Self::Span
            | Self::P
            | Self::Heading(_)
            | Self::Strong
            | Self::B
            | Self::Em
            | Self::I
            | Self::U
            | Self::S
            | Self::Code
            | Self::Pre
            | Self::Small
            | Self::Mark => NodeCategory::Text,
            Self::Img => NodeCategory::Image,
            Self::Br => NodeCategory::LineBreak,
            Self::Extension(_) => NodeCategory::Extension,
        }
    }
}
