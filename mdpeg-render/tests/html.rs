//! HTML output over the full pipeline.

use mdpeg_parser::Extensions;
use mdpeg_render::to_html;

#[test]
fn emphasis_renders_em() {
    assert_eq!(to_html("*foo*\n", Extensions::NONE), "<p><em>foo</em></p>");
}

#[test]
fn strong_renders_strong() {
    assert_eq!(
        to_html("**foo**\n", Extensions::NONE),
        "<p><strong>foo</strong></p>"
    );
}

#[test]
fn heading_and_paragraph() {
    let out = to_html("# Title\n\nBody text.\n", Extensions::NONE);
    assert_eq!(out, "<h1>Title</h1>\n\n<p>Body text.</p>");
}

#[test]
fn resolved_reference_renders_anchor_and_definition_disappears() {
    let out = to_html(
        "See [docs][d].\n\n[d]: /docs \"The Docs\"\n",
        Extensions::NONE,
    );
    assert_eq!(
        out,
        "<p>See <a href=\"/docs\" title=\"The Docs\">docs</a>.</p>"
    );
}

#[test]
fn unresolved_reference_stays_literal() {
    let out = to_html("See [bar].\n", Extensions::NONE);
    assert_eq!(out, "<p>See [bar].</p>");
}

#[test]
fn code_span_escapes_content() {
    let out = to_html("`<b>`\n", Extensions::NONE);
    assert_eq!(out, "<p><code>&lt;b&gt;</code></p>");
}

#[test]
fn verbatim_block_escapes_content() {
    let out = to_html("    a < b\n", Extensions::NONE);
    assert_eq!(out, "<pre><code>a &lt; b\n</code></pre>");
}

#[test]
fn tight_and_loose_lists() {
    let tight = to_html("- a\n- b\n", Extensions::NONE);
    assert_eq!(tight, "<ul>\n<li>a</li>\n<li>b</li>\n</ul>");
    let loose = to_html("- a\n\n- b\n", Extensions::NONE);
    assert_eq!(loose, "<ul>\n<li><p>a</p></li>\n<li><p>b</p></li>\n</ul>");
}

#[test]
fn ordered_list_renders_ol() {
    let out = to_html("1. a\n2. b\n", Extensions::NONE);
    assert!(out.starts_with("<ol>"), "out: {out}");
    assert!(out.ends_with("</ol>"), "out: {out}");
}

#[test]
fn blockquote_wraps_content() {
    let out = to_html("> quoted\n", Extensions::NONE);
    assert_eq!(out, "<blockquote>\n<p>quoted</p>\n</blockquote>");
}

#[test]
fn smart_typography_gated_by_flag() {
    assert_eq!(to_html("a--b\n", Extensions::NONE), "<p>a--b</p>");
    assert_eq!(to_html("a--b\n", Extensions::SMART), "<p>a&ndash;b</p>");
    assert_eq!(to_html("a---b\n", Extensions::SMART), "<p>a&mdash;b</p>");
    assert_eq!(to_html("wait...\n", Extensions::SMART), "<p>wait&hellip;</p>");
}

#[test]
fn footnotes_number_by_first_reference() {
    let src = "\
First.[^late] Second.[^early]

[^early]: defined first
[^late]: defined second
";
    // Definition order is early-then-late in document source order of
    // definitions, but numbering follows reference order.
    let out = to_html(src, Extensions::NOTES);
    let late_marker = out.find("href=\"#fn:1\"").expect("marker 1");
    let early_marker = out.find("href=\"#fn:2\"").expect("marker 2");
    assert!(late_marker < early_marker);
    let fn1 = out.find("<li id=\"fn:1\">").expect("note 1 body");
    assert!(out[fn1..].contains("defined second"), "out:\n{out}");
}

#[test]
fn unreferenced_notes_are_not_emitted() {
    let out = to_html("No markers here.\n\n[^unused]: body\n", Extensions::NOTES);
    assert_eq!(out, "<p>No markers here.</p>");
}

#[test]
fn note_reference_without_extension_is_literal() {
    let out = to_html("x[^n]\n", Extensions::NONE);
    assert_eq!(out, "<p>x[^n]</p>");
}

#[test]
fn autolink_renders_anchor() {
    let out = to_html("<http://example.com/>\n", Extensions::NONE);
    assert_eq!(
        out,
        "<p><a href=\"http://example.com/\">http://example.com/</a></p>"
    );
}

#[test]
fn text_content_escapes_quotes() {
    let out = to_html("say \"hi\" > \"bye\"\n", Extensions::NONE);
    assert_eq!(out, "<p>say &quot;hi&quot; &gt; &quot;bye&quot;</p>");
}

#[test]
fn attribute_values_are_escaped() {
    let out = to_html("[x](/u?a=1&b=2)\n", Extensions::NONE);
    assert!(out.contains("href=\"/u?a=1&amp;b=2\""), "out: {out}");
}
