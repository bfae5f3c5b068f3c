use crate::*;
use pm_core::TokenKind;
use std::path::Path;

fn kinds(source: &str) -> Vec<(TokenKind, String)> {
    tokenize(source)
        .iter()
        .map(|t| (t.kind, t.text.to_string()))
        .collect()
}

fn assert_lossless(source: &str) {
    assert_eq!(tokenize(source).to_source(), source);
}

fn find_kind(source: &str, kind: TokenKind) -> Vec<String> {
    tokenize(source)
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.text.to_string())
        .collect()
}

// ========== Losslessness ==========

#[test]
fn test_lossless_samples() {
    let samples = [
        "",
        "plain html only",
        "<?php echo 1;",
        "<?php\n$a = \"x $b {$c['d']} ${e}\";\n?>\n<b>tail</b>",
        "<?php $s = <<<EOT\nline $x\n  EOT;\n",
        "<?php $s = <<<'EOT'\nraw $x\nEOT;\n",
        "<?php /* unterminated",
        "<?php \"unterminated $x",
        "<?php $x = <<<EOT\nnever closed",
        "<?php // comment ?> html",
        "<?= $a ?>",
        "<?php __halt_compiler(); binary \x01 data <?php",
        "<?php $é = 'ünïcödé';",
        "<?php\r\n$a = 1;\r\n",
        "<?php $a = `ls $dir`;",
        "<?php $a = b\"bin\" . b'x';",
        "<?php $a = \"\\\\\";",
        "<?php $a = \"tail\\",
    ];
    for s in samples {
        assert_lossless(s);
    }
}

// ========== Markup ==========

#[test]
fn test_open_and_close_tags() {
    let toks = kinds("a<?php echo 1; ?>\nb");
    assert_eq!(toks[0], (TokenKind::InlineHtml, "a".into()));
    assert_eq!(toks[1], (TokenKind::OpenTag, "<?php ".into()));
    assert!(toks.contains(&(TokenKind::CloseTag, "?>\n".into())));
    assert_eq!(toks.last().unwrap(), &(TokenKind::InlineHtml, "b".into()));
}

#[test]
fn test_open_tag_with_echo() {
    let toks = kinds("<?= $a ?>");
    assert_eq!(toks[0].0, TokenKind::OpenTagWithEcho);
}

#[test]
fn test_open_tag_crlf() {
    let toks = kinds("<?php\r\n$a;");
    assert_eq!(toks[0], (TokenKind::OpenTag, "<?php\r\n".into()));
}

#[test]
fn test_xml_declaration_is_html() {
    let toks = kinds("<?xml version=\"1.0\"?>");
    assert_eq!(toks.len(), 1);
    assert_eq!(toks[0].0, TokenKind::InlineHtml);
}

// ========== Comments ==========

#[test]
fn test_line_comment_includes_newline() {
    let comments = find_kind("<?php // hi\n$a;", TokenKind::Comment);
    assert_eq!(comments, vec!["// hi\n".to_string()]);
}

#[test]
fn test_line_comment_stops_at_close_tag() {
    let toks = kinds("<?php # hi ?>x");
    assert!(toks.contains(&(TokenKind::Comment, "# hi ".into())));
    assert!(toks.contains(&(TokenKind::CloseTag, "?>".into())));
}

#[test]
fn test_doc_comment_vs_block_comment() {
    assert_eq!(find_kind("<?php /** doc */", TokenKind::DocComment).len(), 1);
    assert_eq!(find_kind("<?php /**/", TokenKind::Comment).len(), 1);
    assert_eq!(find_kind("<?php /* c */", TokenKind::Comment).len(), 1);
}

#[test]
fn test_attribute_is_not_comment() {
    let toks = kinds("<?php #[Attr] function f(){}");
    assert!(toks.contains(&(TokenKind::AttributeStart, "#[".into())));
    assert!(!toks.iter().any(|(k, _)| *k == TokenKind::Comment));
}

// ========== Words and operators ==========

#[test]
fn test_variables_and_words() {
    let toks = kinds("<?php $count = strlen($s);");
    assert!(toks.contains(&(TokenKind::Variable, "$count".into())));
    assert!(toks.contains(&(TokenKind::Word, "strlen".into())));
}

#[test]
fn test_logical_words() {
    assert_eq!(find_kind("<?php $a or $b AND $c;", TokenKind::LogicalOr), vec!["or"]);
    assert_eq!(find_kind("<?php $a or $b AND $c;", TokenKind::LogicalAnd), vec!["AND"]);
}

#[test]
fn test_reserved_word_after_arrow_is_word() {
    assert!(find_kind("<?php $a->and();", TokenKind::LogicalAnd).is_empty());
    assert_eq!(find_kind("<?php $a->list;", TokenKind::Word), vec!["list"]);
    assert_eq!(find_kind("<?php Foo::class;", TokenKind::Word), vec!["Foo", "class"]);
}

#[test]
fn test_keywords() {
    let kw = find_kind("<?php public static function f() { return new Foo; }", TokenKind::Keyword);
    assert_eq!(kw, vec!["public", "static", "function", "return", "new"]);
}

#[test]
fn test_operators() {
    let toks = kinds("<?php $a === $b ?-> c :: d -> e => f <=> g ??= h;");
    assert!(toks.contains(&(TokenKind::Operator, "===".into())));
    assert!(toks.contains(&(TokenKind::ObjectOperator, "?->".into())));
    assert!(toks.contains(&(TokenKind::DoubleColon, "::".into())));
    assert!(toks.contains(&(TokenKind::ObjectOperator, "->".into())));
    assert!(toks.contains(&(TokenKind::Operator, "=>".into())));
    assert!(toks.contains(&(TokenKind::Operator, "<=>".into())));
    assert!(toks.contains(&(TokenKind::Operator, "??=".into())));
}

#[test]
fn test_namespace_separator() {
    let toks = kinds("<?php \\Foo\\bar();");
    assert_eq!(toks.iter().filter(|(k, _)| *k == TokenKind::NsSeparator).count(), 2);
}

#[test]
fn test_cast() {
    assert_eq!(find_kind("<?php $a = ( int )$b;", TokenKind::Cast), vec!["( int )"]);
    assert!(find_kind("<?php f(intval);", TokenKind::Cast).is_empty());
}

#[test]
fn test_numbers() {
    let nums = find_kind("<?php 1 + 0x1F + 1_000 + 1.5e3 + .5 + 0b101;", TokenKind::Number);
    assert_eq!(nums, vec!["1", "0x1F", "1_000", "1.5e3", ".5", "0b101"]);
}

// ========== Strings ==========

#[test]
fn test_plain_double_quoted_is_constant() {
    let toks = kinds("<?php \"a\\$b\";");
    assert!(toks.contains(&(TokenKind::ConstantString, "\"a\\$b\"".into())));
}

#[test]
fn test_interpolated_string_parts() {
    let toks = kinds("<?php \"x $name y\";");
    assert!(toks.contains(&(TokenKind::Punct, "\"".into())));
    assert!(toks.contains(&(TokenKind::StringPart, "x ".into())));
    assert!(toks.contains(&(TokenKind::Variable, "$name".into())));
    assert!(toks.contains(&(TokenKind::StringPart, " y".into())));
}

#[test]
fn test_simple_interpolation_key_is_not_word() {
    let toks = kinds("<?php \"$a[key] $b->prop\";");
    assert!(toks.contains(&(TokenKind::StringPart, "key".into())));
    assert!(!toks.contains(&(TokenKind::Word, "key".into())));
    assert!(toks.contains(&(TokenKind::Word, "prop".into())));
}

#[test]
fn test_complex_interpolation() {
    let toks = kinds("<?php \"{$a['k']} ${b}\";");
    assert!(toks.contains(&(TokenKind::CurlyOpen, "{".into())));
    assert!(toks.contains(&(TokenKind::ConstantString, "'k'".into())));
    assert!(toks.contains(&(TokenKind::DollarOpenCurly, "${".into())));
    assert!(toks.contains(&(TokenKind::StringVarName, "b".into())));
}

#[test]
fn test_heredoc() {
    let toks = kinds("<?php $s = <<<EOT\nhi $x\n    EOT;\n");
    assert!(toks.contains(&(TokenKind::StartHeredoc, "<<<EOT\n".into())));
    assert!(toks.contains(&(TokenKind::HeredocText, "hi ".into())));
    assert!(toks.contains(&(TokenKind::Variable, "$x".into())));
    assert!(toks.contains(&(TokenKind::HeredocText, "\n".into())));
    assert!(toks.contains(&(TokenKind::EndHeredoc, "    EOT".into())));
}

#[test]
fn test_nowdoc_does_not_interpolate() {
    let toks = kinds("<?php $s = <<<'EOT'\nraw $x\nEOT;");
    assert!(toks.contains(&(TokenKind::HeredocText, "raw $x\n".into())));
    assert!(!toks.iter().any(|(k, t)| *k == TokenKind::Variable && t == "$x"));
}

#[test]
fn test_heredoc_label_prefix_in_body() {
    let toks = kinds("<?php $s = <<<EOT\nEOTX\nEOT;");
    assert!(toks.contains(&(TokenKind::HeredocText, "EOTX\n".into())));
    assert!(toks.contains(&(TokenKind::EndHeredoc, "EOT".into())));
}

#[test]
fn test_halt_compiler_data() {
    let toks = kinds("<?php __halt_compiler(); $notcode");
    assert_eq!(toks.last().unwrap(), &(TokenKind::InlineHtml, " $notcode".into()));
}

// ========== Tokenizer trait ==========

#[test]
fn test_can_tokenize() {
    assert!(PhpLexer.can_tokenize(Path::new("src/Main.php")));
    assert!(PhpLexer.can_tokenize(Path::new("src/Main.PHP")));
    assert!(!PhpLexer.can_tokenize(Path::new("plugin.yml")));
}

#[test]
fn test_indices_are_sequential() {
    let stream = tokenize("<?php $a = 1;");
    for (i, t) in stream.iter().enumerate() {
        assert_eq!(t.index, i);
    }
}
