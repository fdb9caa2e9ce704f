use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_editor::{COVER_ERROR_KEY, COVER_IMAGE_KEY};
use strata_model::{
    ensure_unique_ids, Attributes, BlockKind, ContainerNode, Layout, ModelError, Node, TextNode,
};
use strata_surface::markup::escape_attr;
use strata_surface::{build_markup, escape_text};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during HTML export
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Invalid document: {0}")]
    Model(#[from] ModelError),
}

/// Options for HTML export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Wrap the blocks in `<!DOCTYPE html>`, `<head>` and `<body>`
    pub full_document: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
            full_document: false,
            title: None,
        }
    }
}

impl CompileOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }
}

struct Context<'a> {
    options: &'a CompileOptions,
    depth: usize,
    buffer: String,
    skipped: usize,
}

impl<'a> Context<'a> {
    fn new(options: &'a CompileOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
            skipped: 0,
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            for _ in 0..self.depth {
                self.buffer.push_str(&self.options.indent);
            }
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Export a document to static HTML.
///
/// Images and videos that are still uploading, failed to upload or have no
/// `src` are left out. A table row outside a table gets a table of its own,
/// and a list item outside a list gets a list of its own.
pub fn compile_to_html(
    document: &ContainerNode,
    options: &CompileOptions,
) -> Result<String, CompileError> {
    ensure_unique_ids(document)?;

    let mut ctx = Context::new(options);

    if options.full_document {
        ctx.add_line("<!DOCTYPE html>");
        ctx.add_line("<html>");
        ctx.indent();
        compile_head(&mut ctx);
        ctx.add_line("<body>");
        ctx.indent();
    }

    ctx.add_line(&open_tag(
        "div",
        &document.attributes,
        Some("strata-document"),
    ));
    ctx.indent();
    compile_cover(document, &mut ctx);
    for child in &document.children {
        compile_node(child, &mut ctx)?;
    }
    ctx.dedent();
    ctx.add_line("</div>");

    if options.full_document {
        ctx.dedent();
        ctx.add_line("</body>");
        ctx.dedent();
        ctx.add_line("</html>");
    }

    debug!(
        root = %document.id,
        skipped_media = ctx.skipped,
        "exported document"
    );
    Ok(ctx.get_output())
}

fn compile_head(ctx: &mut Context) {
    let title = ctx.options.title.as_deref().unwrap_or("Untitled");
    ctx.add_line("<head>");
    ctx.indent();
    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    ctx.add_line(&format!("<title>{}</title>", escape_text(title)));
    ctx.dedent();
    ctx.add_line("</head>");
}

fn compile_cover(document: &ContainerNode, ctx: &mut Context) {
    let extra = &document.attributes.extra;
    if extra.get(COVER_ERROR_KEY) == Some(&Value::Bool(true)) {
        ctx.skipped += 1;
        return;
    }
    if let Some(Value::String(src)) = extra.get(COVER_IMAGE_KEY) {
        ctx.add_line(&format!(
            "<img class=\"cover-image\" src=\"{}\" />",
            escape_attr(src)
        ));
    }
}

fn compile_node(node: &Node, ctx: &mut Context) -> Result<(), CompileError> {
    match node {
        Node::Container(container) => compile_container(container, ctx),
        Node::Leaf(leaf) => {
            match leaf.kind.implied_list_type() {
                Some(list_type) => {
                    ctx.add_line(&format!("<{}>", list_type.tag()));
                    ctx.indent();
                    compile_leaf(leaf, ctx);
                    ctx.dedent();
                    ctx.add_line(&format!("</{}>", list_type.tag()));
                }
                None => compile_leaf(leaf, ctx),
            }
            Ok(())
        }
    }
}

fn compile_container(container: &ContainerNode, ctx: &mut Context) -> Result<(), CompileError> {
    match container.attributes.layout {
        Some(Layout::Table) => return compile_table(container, ctx),
        Some(Layout::TableRow) => {
            ctx.add_line("<table>");
            ctx.indent();
            compile_row(container, ctx)?;
            ctx.dedent();
            ctx.add_line("</table>");
            return Ok(());
        }
        Some(Layout::Flex) => {
            return compile_children("div", container, Some("flex-row"), ctx);
        }
        None => {}
    }

    match container.list_type() {
        Some(list_type) => compile_list(list_type.tag(), container, ctx),
        None => compile_children("div", container, None, ctx),
    }
}

fn compile_children(
    tag: &str,
    container: &ContainerNode,
    class: Option<&str>,
    ctx: &mut Context,
) -> Result<(), CompileError> {
    ctx.add_line(&open_tag(tag, &container.attributes, class));
    ctx.indent();
    for child in &container.children {
        compile_node(child, ctx)?;
    }
    ctx.dedent();
    ctx.add_line(&format!("</{}>", tag));
    Ok(())
}

fn compile_list(
    tag: &str,
    container: &ContainerNode,
    ctx: &mut Context,
) -> Result<(), CompileError> {
    ctx.add_line(&open_tag(tag, &container.attributes, None));
    ctx.indent();
    for child in &container.children {
        match child.as_ref() {
            // list items already render as <li>
            Node::Leaf(leaf) if leaf.kind.is_list_item() => compile_leaf(leaf, ctx),
            other => {
                ctx.add_line("<li>");
                ctx.indent();
                compile_node(other, ctx)?;
                ctx.dedent();
                ctx.add_line("</li>");
            }
        }
    }
    ctx.dedent();
    ctx.add_line(&format!("</{}>", tag));
    Ok(())
}

fn compile_table(table: &ContainerNode, ctx: &mut Context) -> Result<(), CompileError> {
    ctx.add_line(&open_tag("table", &table.attributes, None));
    ctx.indent();
    for child in &table.children {
        match child.as_ref() {
            Node::Container(row) if row.attributes.layout == Some(Layout::TableRow) => {
                compile_row(row, ctx)?;
            }
            // a bare block directly in a table gets a row of its own
            other => {
                ctx.add_line("<tr>");
                ctx.indent();
                compile_cell(other, ctx)?;
                ctx.dedent();
                ctx.add_line("</tr>");
            }
        }
    }
    ctx.dedent();
    ctx.add_line("</table>");
    Ok(())
}

fn compile_row(row: &ContainerNode, ctx: &mut Context) -> Result<(), CompileError> {
    ctx.add_line(&open_tag("tr", &row.attributes, None));
    ctx.indent();
    for cell in &row.children {
        compile_cell(cell, ctx)?;
    }
    ctx.dedent();
    ctx.add_line("</tr>");
    Ok(())
}

fn compile_cell(cell: &Node, ctx: &mut Context) -> Result<(), CompileError> {
    ctx.add_line("<td>");
    ctx.indent();
    compile_node(cell, ctx)?;
    ctx.dedent();
    ctx.add_line("</td>");
    Ok(())
}

fn compile_leaf(leaf: &TextNode, ctx: &mut Context) {
    match &leaf.kind {
        BlockKind::LineBreak => ctx.add_line("<br />"),
        BlockKind::Image | BlockKind::Video => compile_media(leaf, ctx),
        BlockKind::Code => {
            let open = open_tag("pre", &leaf.attributes, None);
            ctx.add_line(&format!(
                "{}<code>{}</code></pre>",
                open,
                build_markup(leaf, true)
            ));
        }
        BlockKind::Other(tag) => {
            let open = open_tag("div", &leaf.attributes, None);
            // keep the unknown type visible to whoever styles the export
            let open = open.replacen("<div", &format!("<div data-type=\"{}\"", escape_attr(tag)), 1);
            ctx.add_line(&format!("{}{}</div>", open, build_markup(leaf, true)));
        }
        kind => {
            let tag = if kind.is_list_item() { "li" } else { kind.tag() };
            ctx.add_line(&format!(
                "{}{}</{}>",
                open_tag(tag, &leaf.attributes, None),
                build_markup(leaf, true),
                tag
            ));
        }
    }
}

fn compile_media(leaf: &TextNode, ctx: &mut Context) {
    let attributes = &leaf.attributes;
    let src = match attributes.src.as_deref() {
        Some(src) if !attributes.is_loading() && !attributes.has_error() => src,
        _ => {
            debug!(node_id = %leaf.id, "media left out of export");
            ctx.skipped += 1;
            return;
        }
    };

    let mut tag = open_tag(leaf.kind.tag(), attributes, None);
    tag.pop();
    tag.push_str(&format!(" src=\"{}\"", escape_attr(src)));

    if leaf.kind == BlockKind::Video {
        ctx.add_line(&format!("{} controls></video>", tag));
    } else {
        if let Some(alt) = &attributes.alt {
            tag.push_str(&format!(" alt=\"{}\"", escape_attr(alt)));
        }
        ctx.add_line(&format!("{} />", tag));
    }
}

fn open_tag(tag: &str, attributes: &Attributes, class: Option<&str>) -> String {
    let mut out = format!("<{}", tag);

    let classes: Vec<&str> = class
        .into_iter()
        .chain(attributes.class_name.as_deref())
        .filter(|c| !c.is_empty())
        .collect();
    if !classes.is_empty() {
        out.push_str(&format!(" class=\"{}\"", escape_attr(&classes.join(" "))));
    }

    if let Some(color) = &attributes.background_color {
        out.push_str(&format!(
            " style=\"background-color: {}\"",
            escape_attr(color)
        ));
    }

    out.push('>');
    out
}
