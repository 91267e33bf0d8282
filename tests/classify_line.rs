use ripple::core::{classify_file, classify_line, NodeType};

#[test]
fn keywords_map_to_types() {
    let cases = [
        ("import { foo } from './foo';", NodeType::Import),
        ("const foo = require('foo');", NodeType::Import),
        ("export class Foo extends Base {", NodeType::Class),
        ("interface FooProps {", NodeType::Type),
        ("type Alias = Foo | Bar;", NodeType::Type),
        ("const result = foo(1);", NodeType::Variable),
        ("let x = foo;", NodeType::Variable),
        ("var legacy = foo;", NodeType::Variable),
        ("function wrap() { return foo(); }", NodeType::Function),
        ("items.map(item => foo(item));", NodeType::Function),
        ("it('calls foo', () => {", NodeType::Function),
        ("describe('foo', suite);", NodeType::Test),
        ("expect(foo()).toBe(3);", NodeType::Test),
    ];
    for (line, expected) in cases {
        assert_eq!(classify_line(line, "utils.ts"), expected, "{line}");
    }
}

#[test]
fn earlier_rules_win() {
    // import beats class
    assert_eq!(
        classify_line("import { Foo } from './class'", "a.ts"),
        NodeType::Import
    );
    // class beats const
    assert_eq!(
        classify_line("const Foo = class {}", "a.ts"),
        NodeType::Class
    );
    // variable beats arrow function
    assert_eq!(
        classify_line("const handler = () => foo();", "a.ts"),
        NodeType::Variable
    );
}

#[test]
fn keywords_must_be_whole_words() {
    assert_eq!(classify_line("important(foo);", "a.ts"), NodeType::Function);
    assert_eq!(classify_line("classify(foo);", "a.ts"), NodeType::Function);
    assert_eq!(classify_line("constant + foo", "widget.vue"), NodeType::Component);
    assert_eq!(classify_line("typed.foo()", "x.test.ts"), NodeType::Test);
    assert_eq!(classify_line("edit(foo)", "a.d.ts"), NodeType::Type);
}

#[test]
fn keywords_are_case_sensitive() {
    assert_eq!(classify_line("Import Foo", "a.ts"), NodeType::Function);
    assert_eq!(classify_line("CLASS foo", "Nav.jsx"), NodeType::Component);
}

#[test]
fn unmatched_lines_fall_back_to_the_file() {
    assert_eq!(
        classify_line("return x + 1;", "utils.ts"),
        classify_file("utils.ts")
    );
    assert_eq!(classify_line("return x + 1;", "utils.ts"), NodeType::Function);
    assert_eq!(classify_line("", "App.svelte"), NodeType::Component);
    assert_eq!(classify_line("foo(bar)", "api.spec.ts"), NodeType::Test);
}

#[test]
fn classification_is_total() {
    let lines = ["", " ", "=>", "\u{0}", "🦀 foo 🦀", "((((", "\\b"];
    let files = ["", "a", "a.ts", "b.test.ts", "c.vue", "d.d.ts"];
    for line in lines {
        for file in files {
            let result = classify_line(line, file);
            assert_ne!(result, NodeType::Symbol);
        }
    }
}
