//! Décodage et navigation dans l'arbre XML

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use memchr::memmem;
use roxmltree::Node;

use crate::error::ParseError;

/// Espace de noms par défaut (éléments métier : 筆, 座標系...)
pub const NS_TIZU: &str = "http://www.moj.go.jp/MINJI/tizuxml";

/// Espace de noms des éléments géométriques (préfixe `zmn`)
pub const NS_ZMN: &str = "http://www.moj.go.jp/MINJI/tizuzumen";

/// Décode les bytes du document.
///
/// Priorité : BOM, puis pseudo-attribut `encoding` de la déclaration XML,
/// puis UTF-8.
pub fn decode(content: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    let (encoding, body) = match Encoding::for_bom(content) {
        Some((encoding, bom_len)) => (encoding, &content[bom_len..]),
        None => (declared_encoding(content).unwrap_or(UTF_8), content),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            ParseError::malformed_document(format!("invalid {} byte sequence", encoding.name()))
        })
}

/// Lit l'encodage déclaré dans `<?xml ... encoding="..."?>`
fn declared_encoding(content: &[u8]) -> Option<&'static Encoding> {
    if !content.starts_with(b"<?xml") {
        return None;
    }
    let end = memmem::find(content, b"?>")?;
    let decl = &content[..end];

    let pos = memmem::find(decl, b"encoding")?;
    let rest = &decl[pos + b"encoding".len()..];
    let quote_pos = rest.iter().position(|&b| b == b'"' || b == b'\'')?;
    let quote = rest[quote_pos];
    let value = &rest[quote_pos + 1..];
    let value_end = value.iter().position(|&b| b == quote)?;

    Encoding::for_label(&value[..value_end])
}

/// Premier enfant élément portant le nom qualifié donné
pub fn child<'a, 'input>(node: Node<'a, 'input>, ns: &str, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.has_tag_name((ns, name)))
}

/// Enfants éléments portant le nom qualifié donné, dans l'ordre du document
pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    ns: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name((ns, name)))
}

/// Premier descendant (hors le nœud lui-même) portant le nom qualifié donné
pub fn descendant<'a, 'input>(
    node: Node<'a, 'input>,
    ns: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.has_tag_name((ns, name)))
}

/// Enfants éléments, quel que soit leur nom
pub fn elements<'a, 'input: 'a>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

/// Attribut obligatoire d'un élément géométrique
pub fn required_attr<'a>(node: Node<'a, '_>, attr: &str) -> Result<&'a str, ParseError> {
    node.attribute(attr).ok_or_else(|| {
        ParseError::malformed_geometry(
            node.attribute("id").unwrap_or(node.tag_name().name()),
            format!("missing '{}' attribute", attr),
        )
    })
}
