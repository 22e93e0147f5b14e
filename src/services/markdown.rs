//! # 마크다운 렌더링 서비스
//!
//! 게시글 본문(마크다운 원문)을 상세 API 응답용 HTML로 변환합니다.
//! 표, 각주, 취소선, 자동 링크, 제목 앵커(id)를 지원합니다.
//!
//! 본문에 `[TOC]`만 있는 문단이 있으면 그 자리에 목차(제목 링크 목록)를 넣습니다.
//! 문서는 한 번만 파싱하고, 목차 링크는 comrak이 제목에 붙이는 id와
//! 같은 `Anchorizer` 규칙으로 만듭니다. 코드 블록 안의 `[TOC]`와 `#` 줄은
//! 문단·제목 노드가 아니므로 건드리지 않습니다.

use crate::error::AppError;
use comrak::nodes::{AstNode, NodeValue};
use comrak::{format_html, parse_document, Anchorizer, Arena, Options};

const TOC_MARKER: &str = "[TOC]";

/// 렌더링 후 목차로 바꿀 자리표시.
/// 파서가 입력의 NUL을 U+FFFD로 바꾸므로 본문에서 생길 수 없습니다.
const TOC_PLACEHOLDER: &str = "\u{0}toc\u{0}";

/// 마크다운 원문을 HTML 문자열로 렌더링합니다.
pub fn render_html(source: &str) -> Result<String, AppError> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.footnotes = true;
    options.extension.description_lists = true;
    // 빈 접두사: 제목 id가 Anchorizer 결과 그대로입니다.
    options.extension.header_ids = Some(String::new());

    let arena = Arena::new();
    let root = parse_document(&arena, source, &options);

    let mut headings = Vec::new();
    let mut markers = Vec::new();
    for node in root.descendants() {
        match node.data.borrow().value {
            NodeValue::Heading(ref heading) => headings.push((heading.level, plain_text(node))),
            NodeValue::Paragraph if is_toc_marker(node) => markers.push(node),
            _ => {}
        }
    }

    if markers.is_empty() {
        return to_html(root, &options);
    }

    for marker in markers {
        replace_with_placeholder(marker);
    }

    let toc = build_toc(&headings)?;
    let html = to_html(root, &options)?;
    // 느슨하지 않은 목록 안에서는 <p> 없이 렌더링됩니다.
    Ok(html
        .replace(&format!("<p>{}</p>\n", TOC_PLACEHOLDER), &toc)
        .replace(TOC_PLACEHOLDER, &toc))
}

fn to_html<'a>(root: &'a AstNode<'a>, options: &Options) -> Result<String, AppError> {
    let mut html = Vec::new();
    format_html(root, options, &mut html).map_err(render_error)?;
    String::from_utf8(html).map_err(|e| AppError::Internal(format!("Markdown output: {}", e)))
}

fn render_error(err: std::io::Error) -> AppError {
    AppError::Internal(format!("Markdown rendering failed: {}", err))
}

/// 문단의 자식이 텍스트뿐이고 합친 내용이 `[TOC]`인지 확인합니다.
fn is_toc_marker<'a>(paragraph: &'a AstNode<'a>) -> bool {
    let mut text = String::new();
    for child in paragraph.children() {
        match child.data.borrow().value {
            NodeValue::Text(ref literal) => text.push_str(literal),
            _ => return false,
        }
    }
    text.trim() == TOC_MARKER
}

fn replace_with_placeholder<'a>(paragraph: &'a AstNode<'a>) {
    let children: Vec<_> = paragraph.children().collect();
    let Some((first, rest)) = children.split_first() else {
        return;
    };
    if let NodeValue::Text(ref mut literal) = first.data.borrow_mut().value {
        *literal = TOC_PLACEHOLDER.into();
    }
    for node in rest {
        node.detach();
    }
}

/// 제목의 렌더링된 글자만 모읍니다. 링크는 표시 텍스트만, 줄바꿈은 공백이 됩니다.
/// comrak이 제목 id를 만들 때 쓰는 텍스트와 같습니다.
fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    for child in node.children() {
        match child.data.borrow().value {
            NodeValue::Text(ref literal) => out.push_str(literal),
            NodeValue::Code(ref code) => out.push_str(&code.literal),
            NodeValue::LineBreak | NodeValue::SoftBreak => out.push(' '),
            _ => collect_text(child, out),
        }
    }
}

/// 문서 순서의 제목 목록으로 `<div class="toc">`를 만듭니다.
fn build_toc(headings: &[(u8, String)]) -> Result<String, AppError> {
    let mut anchorizer = Anchorizer::new();
    let mut toc = String::from("<div class=\"toc\">\n<ul>\n");

    for (level, text) in headings {
        let anchor = anchorizer.anchorize(text.clone());
        let mut label = Vec::with_capacity(text.len());
        comrak::html::escape(&mut label, text.as_bytes()).map_err(render_error)?;
        toc.push_str(&format!(
            "<li class=\"toc-h{}\"><a href=\"#{}\">{}</a></li>\n",
            level,
            anchor,
            String::from_utf8_lossy(&label)
        ));
    }

    toc.push_str("</ul>\n</div>\n");
    Ok(toc)
}
