//! Nesting-aware query tokenizer, including the unbalanced-paren policies.

use rstest::rstest;

use querytree::domain::{
    split_query_bytes, split_query_text, split_query_text_with, ErrorKind, ParenPolicy,
};

#[rstest]
#[case("a b c", &["a", "b", "c"])]
#[case("a (b c) d", &["a", "(b c)", "d"])]
#[case("", &[""])]
#[case("((a b) c)", &["((a b) c)"])]
#[case("upos=NOUN >amod (L=big >advmod _)", &["upos=NOUN", ">amod", "(L=big >advmod _)"])]
#[case("a\tb", &["a\tb"])]
#[case("a ", &["a", ""])]
fn given_text_when_tokenizing_then_splits_on_depth_zero_spaces(
    #[case] text: &str,
    #[case] expected: &[&str],
) {
    assert_eq!(split_query_text(text).unwrap(), expected);
}

#[rstest]
#[case("a b")]
#[case("x (y z)  w")]
#[case("(((")]
#[case(") a ( b")]
fn given_any_text_when_tokenizing_then_terms_rejoin_to_input(#[case] text: &str) {
    let terms = split_query_text(text).unwrap();
    assert_eq!(terms.join(" "), text);
}

#[test]
fn given_stray_close_paren_when_preserving_then_spaces_stay_joined_until_open() {
    let terms = split_query_text_with("a) b c ( d e", ParenPolicy::Preserve).unwrap();

    assert_eq!(terms, vec!["a) b c (", "d", "e"]);
}

#[test]
fn given_stray_close_paren_when_clamping_then_it_is_a_literal() {
    let terms = split_query_text_with("a) b c ( d e", ParenPolicy::Clamp).unwrap();

    assert_eq!(terms, vec!["a)", "b", "c", "( d e"]);
}

#[rstest]
#[case(ParenPolicy::Preserve)]
#[case(ParenPolicy::Clamp)]
fn given_balanced_text_when_tokenizing_then_policies_agree(#[case] policy: ParenPolicy) {
    let text = "_ >obj (upos=NOUN >amod _) <nsubj _";
    assert_eq!(
        split_query_text_with(text, policy).unwrap(),
        split_query_text(text).unwrap()
    );
}

#[test]
fn given_multibyte_text_when_tokenizing_then_terms_are_whole_characters() {
    let terms = split_query_text("pes (čadič ňa) šťa").unwrap();

    assert_eq!(terms, vec!["pes", "(čadič ňa)", "šťa"]);
}

#[test]
fn given_malformed_utf8_when_tokenizing_bytes_then_invalid_argument() {
    let err = split_query_bytes(&[b'a', b' ', 0xff, 0xfe], ParenPolicy::Preserve).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn given_valid_bytes_when_tokenizing_then_same_as_text() {
    let terms = split_query_bytes(b"a (b c)", ParenPolicy::Preserve).unwrap();

    assert_eq!(terms, vec!["a", "(b c)"]);
}
