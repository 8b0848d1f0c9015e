use std::fs;

use walkdir::WalkDir;
use zelo::run_source;

fn assert_success(src: &str) {
    if let Err(e) = run_source(src) {
        panic!("Script failed: {e}");
    }
}

fn assert_failure(src: &str) {
    if run_source(src).is_ok() {
        panic!("Script succeeded but was expected to fail")
    }
}

#[test]
fn demo_scripts_work() {
    let mut count = 0;

    for entry in WalkDir::new("demos").into_iter()
                                      .filter_map(Result::ok)
                                      .filter(|e| {
                                          e.path().extension().is_some_and(|ext| ext == "z")
                                      })
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        count += 1;
        if let Err(e) = run_source(&content) {
            panic!("Demo script {path:?} failed: {e}");
        }
    }

    assert!(count > 0, "No demo scripts found in demos/");
}

#[test]
fn declarations_and_basic_arithmetic() {
    assert_success("loc x = 1 + 2; assert(x == 3);");
    assert_success("loc x = 7 * 9; assert(x == 63);");
    assert_success("loc x = 8 - 5; assert(x == 3);");
    assert_success("loc x = 10 / 2; assert(x == 5);");
    assert_success("loc x = 7 % 4; assert(x == 3);");
    assert_success("loc x; assert(x == null);");
}

#[test]
fn division_stays_float_and_rejects_zero() {
    assert_success("assert(7 / 2 == 3.5);");
    assert_success("assert(typeof(4 / 2) == \"float\");");
    assert_success("assert(typeof(2 + 3) == \"int\");");
    assert_failure("loc x = 1 / 0;");
    assert_failure("loc x = 1 % 0;");
}

#[test]
fn string_concatenation_stringifies_either_side() {
    assert_success("assert(\"a\" + 1 == \"a1\");");
    assert_success("assert(1 + \"a\" == \"1a\");");
    assert_success("assert(\"v=\" + true == \"v=true\");");
    assert_success("assert(\"n=\" + null == \"n=null\");");
}

#[test]
fn compound_assignments_desugar() {
    assert_success("loc x = 2; x += 3; assert(x == 5);");
    assert_success("loc x = 7; x -= 2; assert(x == 5);");
    assert_success("loc x = 4; x *= 2; assert(x == 8);");
    assert_success("loc x = 9; x /= 3; assert(x == 3);");
    assert_success("loc x = 1; x <<= 3; assert(x == 8);");
    assert_success("loc x = 8; x >>= 2; assert(x == 2);");
    assert_success("loc x = 6; x &= 3; assert(x == 2);");
    assert_success("loc x = 6; x |= 1; assert(x == 7);");
    assert_success("loc x = 6; x ^= 3; assert(x == 5);");
}

#[test]
fn operator_precedence_and_associativity() {
    assert_success("assert(1 + 2 * 3 == 7);");
    assert_success("assert(1 - 2 - 3 == 0 - 4);");
    assert_success("assert(!false == true);");
    assert_success("loc a = 0; loc b = 0; a = b = 1; assert(a == 1); assert(b == 1);");
    assert_success("assert((1 < 2 ? 10 : 20) == 10);");
    assert_success("assert((2 < 1 ? 10 : 20) == 20);");
    assert_success("assert(1 + 1 == 2 && 2 + 2 == 4);");
    assert_success("assert(false || true);");
}

#[test]
fn bitwise_operators_require_integers() {
    assert_success("assert((6 & 3) == 2);");
    assert_success("assert((6 | 1) == 7);");
    assert_success("assert((6 ^ 3) == 5);");
    assert_success("assert((1 << 4) == 16);");
    assert_success("assert((16 >> 2) == 4);");
    assert_success("assert(~0 == 0 - 1);");
    assert_failure("loc x = 1.5 & 2;");
    assert_failure("loc x = ~1.5;");
}

#[test]
fn increment_decrement_are_value_level() {
    assert_success("loc x = 5; assert(++x == 6); assert(x == 5);");
    assert_success("loc x = 5; assert(--x == 4); assert(x == 5);");
}

#[test]
fn truthiness_rules() {
    assert_success("assert(0 ? true : false);");
    assert_success("assert(\"\" ? true : false);");
    assert_success("assert(null ? false : true);");
    assert_success("assert(false ? false : true);");
}

#[test]
fn const_bindings_reject_reassignment() {
    assert_success("const x = 1; assert(x == 1);");
    assert_failure("const x = 1; x = 2;");
    assert_failure("const x = 1; x += 1;");
    assert_success("const x = 1; { loc x = 2; assert(x == 2); } assert(x == 1);");
}

#[test]
fn undefined_variables_fail() {
    assert_failure("loc x = y + 1;");
    assert_failure("y = 1;");
}

#[test]
fn array_indexing_and_negative_indices() {
    assert_success("loc a = [10, 20, 30]; assert(a[0] == 10);");
    assert_success("loc a = [10, 20, 30]; assert(a[-1] == 30);");
    assert_success("loc a = [10, 20, 30]; a[1] = 5; assert(a[1] == 5);");
    assert_success("loc a = [10, 20, 30]; a[-1] = 5; assert(a[2] == 5);");
    assert_failure("loc a = [10, 20, 30]; loc x = a[3];");
    assert_failure("loc a = [10, 20, 30]; loc x = a[-4];");
    assert_failure("loc a = [10, 20, 30]; loc x = a[\"0\"];");
}

#[test]
fn dictionary_access() {
    assert_success("loc d = {\"a\": 1}; assert(d[\"a\"] == 1);");
    assert_success("loc d = {\"a\": 1}; d[\"b\"] = 2; assert(d[\"b\"] == 2);");
    assert_failure("loc d = {\"a\": 1}; loc x = d[\"missing\"];");
    assert_failure("loc d = {\"a\": 1}; loc x = d[0];");
    assert_failure("loc d = {1: 2};");
}

#[test]
fn slicing() {
    assert_success("assert([1, 2, 3, 4, 5][1:4] == [2, 3, 4]);");
    assert_success("assert([1, 2, 3, 4, 5][::-1] == [5, 4, 3, 2, 1]);");
    assert_success("assert([1, 2, 3, 4, 5][:2] == [1, 2]);");
    assert_success("assert([1, 2, 3, 4, 5][3:] == [4, 5]);");
    assert_success("assert([1, 2, 3, 4, 5][::2] == [1, 3, 5]);");
    assert_success("assert([1, 2, 3, 4, 5][-2:] == [4, 5]);");
    assert_success("assert([1, 2, 3][5:] == []);");
    assert_failure("loc x = [1, 2, 3][::0];");
    assert_failure("loc x = {\"a\": 1}[0:1];");
}

#[test]
fn control_flow() {
    assert_success("loc x = 0; if true then x = 1; assert(x == 1);");
    assert_success("loc x = 0; if false then x = 1; else x = 2; assert(x == 2);");
    assert_success("loc x = 0; if false then x = 1; elif true then x = 3; else x = 2; \
                    assert(x == 3);");
    assert_success("loc n = 0; while n < 5 n += 1; assert(n == 5);");
    assert_success("loc total = 0; for (v in [1, 2, 3]) { total += v; } assert(total == 6);");
    assert_failure("for (v in 5) { }");
}

#[test]
fn break_and_continue() {
    assert_success("loc n = 0; while true { n += 1; if n == 3 then break; } assert(n == 3);");
    assert_success("loc total = 0; for (v in [1, 2, 3, 4]) { if v % 2 == 0 then continue; \
                    total += v; } assert(total == 4);");
}

#[test]
fn functions_and_recursion() {
    assert_success("func square(x) { return x * x; } assert(square(3) == 9);");
    assert_success("func add(a, b) { return a + b; } assert(add(2, 5) == 7);");
    assert_success("func fib(n) { if n < 2 then return n; return fib(n - 1) + fib(n - 2); } \
                    assert(fib(10) == 55);");
    assert_success("func nothing() { } assert(nothing() == null);");
    assert_failure("func f(a) { return a; } f(1, 2);");
    assert_failure("func f() { return f(); } f();");
}

#[test]
fn closures_capture_their_environment() {
    assert_success("func make() { loc n = 0; func inc() { n = n + 1; return n; } return inc; } \
                    loc f = make(); assert(f() == 1); assert(f() == 2); assert(f() == 3);");
    assert_success("func make() { loc n = 0; func inc() { n = n + 1; return n; } return inc; } \
                    loc f = make(); loc g = make(); f(); assert(g() == 1);");
}

#[test]
fn classes_constructors_and_methods() {
    assert_success("class Counter { func __init__() { this.n = 0; } \
                    func inc() { this.n = this.n + 1; } } \
                    loc c = Counter(); c.inc(); c.inc(); c.inc(); assert(c.n == 3);");
    assert_success("class P { func __init__(x, y) { this.x = x; this.y = y; } } \
                    loc p = P(1, 2); assert(p.x == 1); assert(p.y == 2);");
    assert_failure("class P { func __init__(x) { this.x = x; } } loc p = P();");
    assert_failure("class P { } loc p = P(); loc v = p.missing;");
}

#[test]
fn method_binding_is_first_class() {
    assert_success("class C { func __init__() { this.n = 41; } func get() { return this.n + 1; } } \
                    loc c = C(); loc f = c.get; assert(f() == c.get());");
}

#[test]
fn inheritance_and_super_lookup() {
    assert_success("class A { func hello() { return \"A\"; } } \
                    class B : A { } \
                    loc b = B(); assert(b.hello() == \"A\");");
    assert_success("class A { func hello() { return \"A\"; } } \
                    class B : A { func hello() { return \"B\"; } } \
                    loc b = B(); assert(b.hello() == \"B\");");
    assert_failure("loc x = 1; class B : x { }");
}

#[test]
fn operator_overloads_dispatch_on_the_left() {
    assert_success("class V { func __init__(x) { this.x = x; } \
                    func __add__(o) { return V(this.x + o.x); } } \
                    loc r = V(2) + V(3); assert(r.x == 5);");
    assert_success("class V { func __add__(o) { return 1; } } loc a = V(); assert(a + a == 1);");
    assert_success("class V { func __lt__(o) { return true; } } loc a = V(); assert(a < a);");
    assert_success("class V { func __getitem__(k) { return k + 1; } } \
                    loc a = V(); assert(a[41] == 42);");
    assert_failure("class V { } loc a = V(); loc r = 1 + a;");
}

#[test]
fn getattr_and_setattr_hooks() {
    assert_success("class D { func __getattr__(name) { return name + \"!\"; } } \
                    loc d = D(); assert(d.anything == \"anything!\");");
    assert_success("class S { func __init__() { } } \
                    loc s = S(); s.x = 1; assert(s.x == 1);");
}

#[test]
fn try_catch_binds_thrown_value() {
    assert_success("try { throw \"boom\"; } catch (e) { assert(e == \"boom\"); }");
    assert_success("try { throw 42; } catch (e) { assert(e == 42); }");
    assert_success("loc caught = false; try { loc x = 1 / 0; } catch (e) { caught = true; } \
                    assert(caught);");
    assert_success("loc ok = true; try { ok = true; } catch (e) { ok = false; } assert(ok);");
    assert_failure("throw \"unhandled\";");
}

#[test]
fn catch_restores_the_environment() {
    assert_success("loc x = 1; try { loc x = 2; throw \"up\"; } catch (e) { } assert(x == 1);");
}

#[test]
fn macros_expand_before_parsing() {
    assert_success("macro SQR(x) (x) * (x) ; assert(SQR(3 + 1) == 16);");
    assert_success("macro PI 3 ; assert(PI + 1 == 4);");
    assert_success("macro TWICE(a) a + a ; assert(TWICE(2) * 3 == 8);");
    assert_failure("macro SQR(x) (x) * (x) ; loc y = SQR(1, 2);");
}

#[test]
fn type_annotations_are_checked_at_runtime() {
    assert_success("loc x: int = 1;");
    assert_success("loc x: int|float = 2.5;");
    assert_success("loc x: float = 1;");
    assert_success("loc xs: array[int] = [1, 2, 3];");
    assert_success("loc d: dict{string: int} = {\"a\": 1};");
    assert_failure("loc x: int = \"text\";");
    assert_failure("loc xs: array[int] = [1, \"two\"];");
    assert_failure("loc x: bool = 1;");
    assert_success("func f(x: int): int { return x + 1; } assert(f(1) == 2);");
    assert_failure("func f(x: int) { return x; } f(\"s\");");
    assert_failure("func f(x): int { return \"s\"; } f(1);");
}

#[test]
fn casts() {
    assert_success("assert((3.7 as int) == 3);");
    assert_success("assert((\"5\" as int) == 5);");
    assert_success("assert((1 as string) == \"1\");");
    assert_success("assert((null as string) == \"null\");");
    assert_success("assert((true as int) == 1);");
    assert_success("assert((0 as bool) == false);");
    assert_failure("loc x = \"abc\" as int;");
}

#[test]
fn typeof_reports_dynamic_kinds() {
    assert_success("assert(typeof(null) == \"null\");");
    assert_success("assert(typeof(1) == \"int\");");
    assert_success("assert(typeof(1.5) == \"float\");");
    assert_success("assert(typeof(true) == \"bool\");");
    assert_success("assert(typeof(\"s\") == \"string\");");
    assert_success("assert(typeof([1]) == \"array\");");
    assert_success("assert(typeof({\"k\": 1}) == \"dict\");");
    assert_success("class C { } assert(typeof(C) == \"class\"); assert(typeof(C()) == \"object\");");
    assert_success("func f() { } assert(typeof(f) == \"function\");");
}

#[test]
fn builtin_functions() {
    assert_success("assert(len(\"abc\") == 3);");
    assert_success("assert(len([1, 2]) == 2);");
    assert_success("assert(abs(0 - 5) == 5);");
    assert_success("assert(min(3, 2) == 2); assert(max(3, 2) == 3);");
    assert_success("assert(chr(65) == \"A\"); assert(ord(\"A\") == 65);");
    assert_success("assert(range(3) == [0, 1, 2]);");
    assert_success("assert(range(1, 4) == [1, 2, 3]);");
    assert_success("assert(range(5, 0, -2) == [5, 3, 1]);");
    assert_success("loc a = [1]; loc b = clone(a); push(b, 2); assert(len(a) == 1);");
    assert_failure("assert(false);");
    assert_failure("panic(\"nope\");");
    assert_failure("pop([]);");
}

#[test]
fn repr_quotes_strings() {
    assert_success("assert(repr(\"a\") == \"\\\"a\\\"\");");
    assert_success("assert(repr(null) == \"null\");");
    assert_success("assert(repr(true) == \"true\");");
    assert_success("assert(repr(42) == \"42\");");
    assert_success("assert(repr([1, 2]) == \"[1, 2]\");");
}

#[test]
fn isinstance_checks_type_names_and_unions() {
    assert_success("assert(isinstance(1, \"int\"));");
    assert_success("assert(!isinstance(1, \"float\"));");
    assert_success("assert(isinstance(1.5, \"int|float\"));");
    assert_success("assert(isinstance(1, \"int|float\"));");
    assert_success("assert(!isinstance(\"s\", \"int|float\"));");
    assert_success("assert(isinstance(null, \"null\"));");
    assert_success("assert(isinstance([1], \"array\"));");
    assert_success("class C { } assert(isinstance(C, \"class\")); \
                    assert(isinstance(C(), \"object\"));");
    assert_success("func f() { } assert(isinstance(f, \"function\"));");
    assert_failure("isinstance(1, \"nope\");");
    assert_failure("isinstance(1, 2);");
}

#[test]
fn type_predicates() {
    assert_success("assert(is_int(1)); assert(!is_int(1.5));");
    assert_success("assert(is_float(2.5)); assert(!is_float(2));");
    assert_success("assert(is_bool(true)); assert(!is_bool(1));");
    assert_success("assert(is_string(\"s\")); assert(!is_string(1));");
    assert_success("assert(is_array([1])); assert(!is_array(\"s\"));");
    assert_success("assert(is_dict({\"k\": 1})); assert(!is_dict([1]));");
    assert_success("assert(is_null(null)); assert(!is_null(0));");
    assert_success("class C { } assert(is_object(C())); assert(!is_object(C));");
    assert_success("func f() { } assert(is_function(f)); assert(!is_function(1));");
}

#[test]
fn object_introspection() {
    assert_success("class C { func __init__() { this.a = 1; this.b = 2; } func m() { } } \
                    loc c = C(); \
                    assert(len(object_fields(c)) == 2); \
                    assert(len(object_methods(c)) == 2);");
    assert_failure("object_fields(1);");
    assert_failure("object_methods([1]);");
}

#[test]
fn require_and_include_are_plain_identifiers() {
    assert_success("assert(typeof(require) == \"function\");");
    assert_success("assert(typeof(include) == \"function\");");
    // Shadowing the globals is legal, like for any other builtin name.
    assert_success("loc require = 1; assert(require == 1);");
}

#[test]
fn namespaces_bind_child_environments() {
    assert_success("namespace math_tools { func double(x) { return x * 2; } loc two = 2; } \
                    assert(math_tools.double(21) == 42); assert(math_tools.two == 2);");
    assert_failure("namespace ns { } loc v = ns.missing;");
}

#[test]
fn strings_and_escapes() {
    assert_success(r#"assert(len("a\n") == 2);"#);
    assert_success(r#"assert("tab\there" == "tab" + "\t" + "here");"#);
    assert_success("assert('single' == \"single\");");
    assert_success(r#"assert("it's" == 'it\'s');"#);
}

#[test]
fn number_bases_and_floats() {
    assert_success("assert(0xff == 255);");
    assert_success("assert(0b1010 == 10);");
    assert_success("assert(0o755 == 493);");
    assert_success("assert(2e2 == 200.0);");
    assert_success("assert(typeof(1.) == \"float\");");
}

#[test]
fn lexer_rejects_stray_ranges_and_unknown_characters() {
    assert_failure("loc r = 1 .. 2;");
    assert_failure("loc r = $;");
}

#[test]
fn await_is_reserved() {
    assert_failure("loc x = await 1;");
}

#[test]
fn modules_import_export_and_caching() {
    let dir = std::env::temp_dir().join("zelo_module_tests");
    fs::create_dir_all(&dir).unwrap();

    let exported = dir.join("exported.z");
    fs::write(&exported,
              "loc hidden = 1; func double(x) { return x * 2; } loc answer = 42; \
               export double; export { answer };").unwrap();

    let plain = dir.join("plain.z");
    fs::write(&plain, "func triple(x) { return x * 3; }").unwrap();

    let module = exported.display().to_string();
    assert_success(&format!("import \"{module}\"; assert(double(21) == 42); \
                             assert(answer == 42);"));
    assert_success(&format!("import {{answer}} from \"{module}\"; assert(answer == 42);"));
    assert_success(&format!("import \"{module}\" as m; assert(m.double(2) == 4);"));
    assert_failure(&format!("import {{missing}} from \"{module}\";"));

    // A module without an export list exposes its whole environment.
    let plain_path = plain.display().to_string();
    assert_success(&format!("import \"{plain_path}\"; assert(triple(3) == 9);"));

    // require caches by resolved path; include re-executes every time.
    assert_success(&format!("loc a = require(\"{module}\"); loc b = require(\"{module}\"); \
                             assert(a == b);"));
    assert_success(&format!("loc a = include(\"{plain_path}\"); \
                             loc b = include(\"{plain_path}\"); \
                             assert(!(a == b)); assert(a.triple(2) == 6);"));

    assert_failure("import \"definitely_not_a_module_anywhere\";");
    assert_failure("export not_defined_here;");
}

#[test]
fn circular_requires_are_detected() {
    let dir = std::env::temp_dir().join("zelo_circular_tests");
    fs::create_dir_all(&dir).unwrap();

    let first = dir.join("first.z");
    let second = dir.join("second.z");
    fs::write(&first,
              format!("loc other = require(\"{}\");", second.display())).unwrap();
    fs::write(&second,
              format!("loc other = require(\"{}\");", first.display())).unwrap();

    assert_failure(&format!("import \"{}\";", first.display()));
}

#[test]
fn type_compatibility_relation() {
    use zelo::{ast::{TypeAnnotation, TypeKind},
               interpreter::types::is_compatible};

    let int_t = TypeAnnotation { kinds: vec![TypeKind::Int],
                                 ..TypeAnnotation::default() };
    let float_t = TypeAnnotation { kinds: vec![TypeKind::Float],
                                   ..TypeAnnotation::default() };
    let string_t = TypeAnnotation { kinds: vec![TypeKind::Str],
                                    ..TypeAnnotation::default() };
    let bool_t = TypeAnnotation { kinds: vec![TypeKind::Bool],
                                  ..TypeAnnotation::default() };
    let any_t = TypeAnnotation { kinds: vec![TypeKind::Any],
                                 ..TypeAnnotation::default() };

    assert!(is_compatible(&int_t, &int_t));
    assert!(is_compatible(&int_t, &float_t));
    assert!(!is_compatible(&float_t, &int_t));
    assert!(is_compatible(&bool_t, &int_t));
    assert!(is_compatible(&bool_t, &float_t));
    assert!(is_compatible(&int_t, &string_t));
    assert!(is_compatible(&string_t, &any_t));
    assert!(!is_compatible(&string_t, &bool_t));

    let int_array = TypeAnnotation { is_array: true,
                                     element: Some(Box::new(int_t.clone())),
                                     ..TypeAnnotation::default() };
    let float_array = TypeAnnotation { is_array: true,
                                       element: Some(Box::new(float_t)),
                                       ..TypeAnnotation::default() };
    assert!(is_compatible(&int_array, &float_array));
    assert!(!is_compatible(&int_array, &int_t));
}

#[test]
fn builtin_registry_names_are_installed() {
    use zelo::interpreter::builtins::BUILTIN_FUNCTIONS;

    for name in ["print", "typeof", "len", "assert", "require", "include"] {
        assert!(BUILTIN_FUNCTIONS.contains(&name), "missing builtin {name}");
    }

    // Every listed builtin resolves to a callable value.
    for name in BUILTIN_FUNCTIONS {
        assert_success(&format!("assert(typeof({name}) == \"function\");"));
    }
}

#[test]
fn ast_nodes_carry_their_source_line() {
    let statements = zelo::compile("loc a = 1;\nloc b =\n    2 + 3;").unwrap();

    match &statements[1] {
        zelo::ast::Stmt::VarDecl { initializer: Some(expr), .. } => {
            assert_eq!(expr.line_number(), 3);
        },
        other => panic!("expected a declaration, got {other:?}"),
    }
}

#[test]
fn keyword_tokens_round_trip() {
    use zelo::interpreter::lexer::{TokenKind, tokenize};

    for (source, kind) in [("loc", TokenKind::Loc),
                           ("func", TokenKind::Func),
                           ("class", TokenKind::Class),
                           ("while", TokenKind::While),
                           ("return", TokenKind::Return),
                           ("import", TokenKind::Import),
                           ("macro", TokenKind::Macro),
                           ("await", TokenKind::Await)]
    {
        let tokens = tokenize(source);
        assert_eq!(tokens.len(), 2, "{source} should lex to one token plus EOF");
        assert_eq!(tokens[0].kind, kind);
    }
}

#[test]
fn multi_character_operators_match_maximally() {
    use zelo::interpreter::lexer::{TokenKind, tokenize};

    let tokens = tokenize("<<=");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, TokenKind::ShlAssign);

    let tokens = tokenize(">>= ... -> ++");
    assert_eq!(tokens[0].kind, TokenKind::ShrAssign);
    assert_eq!(tokens[1].kind, TokenKind::Ellipsis);
    assert_eq!(tokens[2].kind, TokenKind::Arrow);
    assert_eq!(tokens[3].kind, TokenKind::Increment);
}

#[test]
fn unterminated_strings_still_lex() {
    use zelo::interpreter::lexer::{TokenKind, tokenize};

    let tokens = tokenize("\"no closing quote");
    assert_eq!(tokens[0].kind, TokenKind::Str("no closing quote".to_string()));
}

#[test]
fn parser_reports_one_error_per_synchronisation_point() {
    let errors = zelo::compile("loc = 1; loc ok = 2; func = 3;").unwrap_err();
    assert_eq!(errors.len(), 2);
}

#[test]
fn comments_are_skipped() {
    assert_success("# hash comment\nloc x = 1; // line comment\n/* block\ncomment */ \
                    assert(x == 1);");
    assert_success("loc x = 1; /* terminates at first */ assert(x == 1);");
}
