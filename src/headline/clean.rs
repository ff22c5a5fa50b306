//! Sanitation of rendered headlines for presentation surfaces.

/// The only element kept by [`clean_headline`].
const HIGHLIGHT_TAG: &str = "mark";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Element {
        name: String,
        open_tag: String,
        children: Vec<Node>,
    },
}

impl Node {
    fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Element { children, .. } => children.iter().all(Self::is_blank),
        }
    }
}

/// Normalizes a headline fragment.
///
/// Leading and trailing whitespace-only nodes are dropped, every element other than
/// `<mark>` is unwrapped (or replaced by a single space when it holds no text), and
/// runs of whitespace collapse to one space. An empty headline stays empty.
pub fn clean_headline(headline: &str) -> String {
    let mut nodes = parse(headline);

    let leading = nodes.iter().take_while(|n| n.is_blank()).count();
    nodes.drain(..leading);
    while nodes.last().is_some_and(Node::is_blank) {
        nodes.pop();
    }

    let mut html = String::new();
    for node in unwrap_extraneous(nodes) {
        serialize(&node, &mut html);
    }

    html.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn unwrap_extraneous(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element {
                name,
                open_tag,
                children,
            } if name == HIGHLIGHT_TAG => out.push(Node::Element {
                name,
                open_tag,
                children: unwrap_extraneous(children),
            }),
            element @ Node::Element { .. } if element.is_blank() => {
                out.push(Node::Text(" ".to_string()));
            }
            Node::Element { children, .. } => out.extend(unwrap_extraneous(children)),
            text @ Node::Text(_) => out.push(text),
        }
    }
    out
}

fn serialize(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Element {
            name,
            open_tag,
            children,
        } => {
            out.push_str(open_tag);
            for child in children {
                serialize(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

enum Tag<'a> {
    Open { name: String, raw: &'a str, self_closing: bool },
    Close { name: String },
}

/// Lenient fragment parser: unmatched closing tags are dropped, unclosed elements
/// close at the end of input, and a `<` that does not start a tag is text.
fn parse(html: &str) -> Vec<Node> {
    // Each frame holds an open element's name, raw opening tag and children so far.
    let mut stack: Vec<(String, String, Vec<Node>)> = vec![(String::new(), String::new(), vec![])];
    let mut rest = html;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            push_text(&mut stack, rest);
            break;
        };
        push_text(&mut stack, &rest[..lt]);
        rest = &rest[lt..];

        let Some((tag, len)) = scan_tag(rest) else {
            push_text(&mut stack, "<");
            rest = &rest[1..];
            continue;
        };
        rest = &rest[len..];

        match tag {
            Tag::Open {
                name,
                raw,
                self_closing,
            } => {
                if self_closing || is_void(&name) {
                    push_node(
                        &mut stack,
                        Node::Element {
                            name,
                            open_tag: raw.to_string(),
                            children: vec![],
                        },
                    );
                } else {
                    stack.push((name, raw.to_string(), vec![]));
                }
            }
            Tag::Close { name } => {
                let Some(depth) = stack.iter().skip(1).rposition(|(open, _, _)| *open == name) else {
                    continue;
                };
                while stack.len() > depth + 1 {
                    close_top(&mut stack);
                }
            }
        }
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }
    stack.pop().map(|(_, _, nodes)| nodes).unwrap_or_default()
}

fn push_text(stack: &mut [(String, String, Vec<Node>)], text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some((_, _, children)) = stack.last_mut() {
        if let Some(Node::Text(last)) = children.last_mut() {
            last.push_str(text);
        } else {
            children.push(Node::Text(text.to_string()));
        }
    }
}

fn push_node(stack: &mut [(String, String, Vec<Node>)], node: Node) {
    if let Some((_, _, children)) = stack.last_mut() {
        children.push(node);
    }
}

fn close_top(stack: &mut Vec<(String, String, Vec<Node>)>) {
    if let Some((name, open_tag, children)) = stack.pop() {
        push_node(
            stack,
            Node::Element {
                name,
                open_tag,
                children,
            },
        );
    }
}

/// Recognizes `<name ...>`, `<name .../>` and `</name>` at the start of `input`.
fn scan_tag(input: &str) -> Option<(Tag<'_>, usize)> {
    let end = input.find('>')?;
    let raw = &input[..=end];
    let inner = &raw[1..raw.len() - 1];

    let (closing, inner) = match inner.strip_prefix('/') {
        Some(stripped) => (true, stripped),
        None => (false, inner),
    };
    if !inner.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase();

    let tag = if closing {
        Tag::Close { name }
    } else {
        Tag::Open {
            name,
            raw,
            self_closing: inner.trim_end().ends_with('/'),
        }
    };
    Some((tag, raw.len()))
}

fn is_void(name: &str) -> bool {
    matches!(name, "br" | "hr" | "img" | "wbr" | "input" | "meta" | "link")
}
