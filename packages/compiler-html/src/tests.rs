use crate::{compile_to_html, CompileError, CompileOptions};
use serde_json::json;
use strata_model::{Attributes, BlockKind, ContainerNode, InlineRun, Layout, ListType, TextNode};

fn compact(document: &ContainerNode) -> String {
    compile_to_html(document, &CompileOptions::compact()).expect("Failed to compile")
}

#[test]
fn test_compile_simple_document() {
    let document = ContainerNode::new("root")
        .with_child(TextNode::paragraph("p1", "Hello & bye"))
        .with_child(TextNode::new("h", BlockKind::heading(2)).with_content("Title"));

    let html = compile_to_html(&document, &CompileOptions::default()).expect("Failed to compile");

    println!("Generated HTML:\n{}", html);

    assert_eq!(
        html,
        "<div class=\"strata-document\">\n  <p>Hello &amp; bye</p>\n  <h2>Title</h2>\n</div>\n"
    );
}

#[test]
fn test_compile_lists() {
    let explicit = ContainerNode::new("l1")
        .with_attributes(Attributes::new().with_list_type(ListType::Ordered))
        .with_child(TextNode::paragraph("a", "x"));
    let legacy = ContainerNode::new("l2")
        .with_child(TextNode::new("b", BlockKind::ListItem).with_content("y"))
        .with_child(TextNode::paragraph("c", "z"));
    let document = ContainerNode::new("root").with_child(explicit).with_child(legacy);

    let html = compact(&document);

    assert!(html.contains("<ol><li><p>x</p></li></ol>"));
    assert!(html.contains("<ul><li>y</li><li><p>z</p></li></ul>"));
}

#[test]
fn test_compile_table_and_flex() {
    let table = ContainerNode::new("t")
        .with_attributes(Attributes::new().with_layout(Layout::Table))
        .with_child(
            ContainerNode::new("r")
                .with_attributes(Attributes::new().with_layout(Layout::TableRow))
                .with_child(TextNode::paragraph("c1", "1"))
                .with_child(TextNode::paragraph("c2", "2")),
        )
        .with_child(TextNode::paragraph("loose", "3"));
    let flex = ContainerNode::new("f")
        .with_attributes(
            Attributes::new()
                .with_layout(Layout::Flex)
                .with_class_name("hero")
                .with_background_color("#fff"),
        )
        .with_child(TextNode::paragraph("c3", "side"));
    let document = ContainerNode::new("root").with_child(table).with_child(flex);

    let html = compact(&document);

    assert!(html.contains(
        "<table><tr><td><p>1</p></td><td><p>2</p></td></tr><tr><td><p>3</p></td></tr></table>"
    ));
    assert!(html.contains(
        r#"<div class="flex-row hero" style="background-color: #fff"><p>side</p></div>"#
    ));
}

#[test]
fn test_stray_rows_and_items_get_their_own_wrapper() {
    let document = ContainerNode::new("root")
        .with_child(
            ContainerNode::new("r")
                .with_attributes(Attributes::new().with_layout(Layout::TableRow))
                .with_child(TextNode::paragraph("c1", "1")),
        )
        .with_child(TextNode::new("li", BlockKind::ListItem).with_content("a"))
        .with_child(TextNode::new("ol", BlockKind::OrderedListItem).with_content("b"));

    let html = compact(&document);

    assert!(html.contains("<table><tr><td><p>1</p></td></tr></table>"));
    assert!(html.contains("<ul><li>a</li></ul><ol><li>b</li></ol>"));
}

#[test]
fn test_pending_and_failed_media_are_skipped() {
    let document = ContainerNode::new("root")
        .with_child(
            TextNode::new("uploading", BlockKind::Image)
                .with_attributes(Attributes::new().with_src("tmp.png").with_loading(true)),
        )
        .with_child(
            TextNode::new("failed", BlockKind::Image)
                .with_attributes(Attributes::new().with_src("bad.png").with_error(true)),
        )
        .with_child(TextNode::new("empty", BlockKind::Image))
        .with_child(
            TextNode::new("ok", BlockKind::Image)
                .with_attributes(Attributes::new().with_src("a.png").with_alt("A \"quoted\"")),
        )
        .with_child(
            TextNode::new("clip", BlockKind::Video)
                .with_attributes(Attributes::new().with_src("v.mp4")),
        );

    let html = compact(&document);

    assert!(!html.contains("tmp.png"));
    assert!(!html.contains("bad.png"));
    assert_eq!(html.matches("<img").count(), 1);
    assert!(html.contains(r#"<img src="a.png" alt="A &quot;quoted&quot;" />"#));
    assert!(html.contains(r#"<video src="v.mp4" controls></video>"#));
}

#[test]
fn test_leaf_kinds() {
    let document = ContainerNode::new("root")
        .with_child(TextNode::new("code", BlockKind::Code).with_content("a < b"))
        .with_child(TextNode::new("q", BlockKind::Blockquote).with_content("quote"))
        .with_child(TextNode::new("br", BlockKind::LineBreak))
        .with_child(TextNode::new("x", BlockKind::Other("callout".into())).with_content("note"));

    let html = compact(&document);

    assert!(html.contains("<pre><code>a &lt; b</code></pre>"));
    assert!(html.contains("<blockquote>quote</blockquote>"));
    assert!(html.contains("<br />"));
    assert!(html.contains(r#"<div data-type="callout">note</div>"#));
}

#[test]
fn test_links_open_in_new_tab() {
    let document = ContainerNode::new("root").with_child(
        TextNode::paragraph("p1", "").with_runs(vec![
            InlineRun::plain("see "),
            InlineRun::plain("docs").with_link("https://example.com").bold(),
        ]),
    );

    let html = compact(&document);

    assert!(html.contains(
        r#"<p>see <span class="bold"><a href="https://example.com" target="_blank" rel="noopener noreferrer">docs</a></span></p>"#
    ));
}

#[test]
fn test_full_document_and_cover() {
    let document = ContainerNode::new("root")
        .with_attributes(Attributes::new().with_extra("coverImage", json!("cover.png")))
        .with_child(TextNode::paragraph("p1", "body"));
    let options = CompileOptions {
        full_document: true,
        title: Some("Notes <draft>".into()),
        ..CompileOptions::default()
    };

    let html = compile_to_html(&document, &options).expect("Failed to compile");

    println!("Generated HTML:\n{}", html);

    assert!(html.starts_with("<!DOCTYPE html>\n<html>\n"));
    assert!(html.contains("<title>Notes &lt;draft&gt;</title>"));
    assert!(html.contains("    <div class=\"strata-document\">\n      <img class=\"cover-image\" src=\"cover.png\" />\n"));
    assert!(html.trim_end().ends_with("</html>"));
}

#[test]
fn test_failed_cover_is_left_out() {
    let document = ContainerNode::new("root").with_attributes(
        Attributes::new()
            .with_extra("coverImage", json!("cover.png"))
            .with_extra("coverImageError", json!(true)),
    );

    assert_eq!(compact(&document), r#"<div class="strata-document"></div>"#);
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let document = ContainerNode::new("root")
        .with_child(TextNode::paragraph("p1", "a"))
        .with_child(TextNode::paragraph("p1", "b"));

    let err = compile_to_html(&document, &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::Model(_)));
}

#[test]
fn test_options_from_config_json() {
    let options: CompileOptions =
        serde_json::from_value(json!({ "fullDocument": true, "indent": "\t" })).unwrap();

    assert!(options.pretty);
    assert!(options.full_document);
    assert_eq!(options.indent, "\t");
    assert_eq!(options.title, None);
}
