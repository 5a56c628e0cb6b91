//! Generation of the skeleton shipped in `template/variant.hpp`.

use tempfile::TempDir;
use varigen::generation::{run_check, run_generate, GenerateRequest};
use varigen::{generate, GenerateOptions, GenerationParameters, Skeleton};

use crate::integration::bundled_skeleton_path;

fn bundled(type_count: i64, visitor_arity: i64) -> String {
    let skeleton = Skeleton::load(bundled_skeleton_path()).unwrap();
    let params = GenerationParameters::new(type_count, visitor_arity).unwrap();
    generate(&skeleton, params, GenerateOptions::default())
        .unwrap()
        .text
}

fn assert_no_residue(text: &str) {
    assert!(!text.contains("${"), "fragment syntax left in artifact");
    assert!(!text.contains("%%"), "directive or reference left in artifact");
}

#[test]
fn test_three_types_two_visitor_args() {
    let text = bundled(3, 2);
    assert_no_residue(&text);

    assert!(text.contains("#define variant_MAX_TYPES  3\n"));
    assert!(text.contains("#define variant_MAX_VISITOR_ARGS  2\n"));
    assert!(text.contains(
        "#define variant_TL3( T1, T2, T3 ) detail::typelist< T1, variant_TL2( T2, T3 ) >\n"
    ));
    assert!(text.contains("#define variant_TL1( T1 ) detail::typelist< T1, variant_TL0(  ) >\n"));
    assert!(text.contains(
        "template<\n    class T0,\n    class T1 = detail::T1,\n    class T2 = detail::T2\n>\nclass variant\n"
    ));
    assert!(text.contains("typedef variant_TL3( T0, T1, T2 ) variant_types;"));

    assert_eq!(text.matches("    variant( T").count(), 3 + 3);
    assert!(text.contains("    variant( T2 const & t2 ) : type_index( 2 ) { new( ptr() ) T2( t2 ); }\n"));
    assert!(!text.contains("T3 const &"));

    assert_eq!(text.matches("struct visit_dispatch").count(), 3);
    assert!(text.contains(
        "inline R visit( Visitor const & vis, V1 const & v1, V2 const & v2 )\n"
    ));
    assert!(text.contains("case 2: return at3( a1, get<2>( v2 ) );"));
    assert!(text.contains("return vis( a1, a2 );"));
    assert!(!text.contains("V3"));

    assert!(text.ends_with("#endif // NONSTD_VARIANT_LITE_HPP\n"));
}

#[test]
fn test_parameters_are_emitted_once() {
    let text = bundled(3, 2);
    assert_eq!(text.matches("#define variant_MAX_TYPES").count(), 1);
    assert_eq!(text.matches("#define variant_MAX_VISITOR_ARGS").count(), 1);
    assert_eq!(text.matches("variant_TL3( T0, T1, T2 )").count(), 3);
}

#[test]
fn test_assignment_swap_and_access_constructs() {
    let text = bundled(3, 2);

    assert_eq!(text.matches("    variant & operator=( T").count(), 3 + 3);
    assert!(text.contains(
        "    variant & operator=( T1 && t1 ) { return move_assign_value<1>( std::move( t1 ) ); }
"
    ));

    assert!(text.contains("    void swap( variant & rhs )
"));
    assert!(text.contains(
        "            case 2: swap( this->template get<2>(), rhs.template get<2>() ); break;
"
    ));
    assert!(text.contains(
        "inline void swap( variant< T0, T1, T2 > & a, variant< T0, T1, T2 > & b )
"
    ));

    assert!(text.contains("inline R & get( variant< T0, T1, T2 > & v )
"));
    assert_eq!(text.matches("get_if( variant< T0, T1, T2 >").count(), 4);

    for op in ["operator>(", "operator<=(", "operator>=("] {
        assert!(
            text.contains(&format!("inline bool {} variant< T0, T1, T2 > const & v", op)),
            "missing {}",
            op
        );
    }
    assert!(text.contains("class monostate {};"));
    assert!(text.contains("using variants::monostate;"));
}

#[test]
fn test_minimal_parameters() {
    let text = bundled(1, 0);
    assert_no_residue(&text);

    assert!(text.contains("#define variant_MAX_TYPES  1\n"));
    assert!(text.contains("#define variant_MAX_VISITOR_ARGS  0\n"));
    assert!(text.contains("template<\n    class T0\n>\nclass variant\n"));
    assert_eq!(text.matches("struct visit_dispatch").count(), 1);
    assert!(text.contains("inline R visit( Visitor const & vis )\n"));
    assert!(text.contains("return vis(  );"));
    assert!(!text.contains("T1 = detail"));
}

#[test]
fn test_default_parameters_scale_linearly() {
    let text = bundled(16, 5);
    assert_no_residue(&text);
    assert!(text.contains("#define variant_MAX_TYPES  16\n"));
    assert!(text.contains("case 15: return at6( a1, a2, a3, a4, get<15>( v5 ) );"));
    assert_eq!(text.matches("struct visit_dispatch").count(), 6);
}

#[test]
fn test_bundled_generate_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let request = GenerateRequest {
        skeleton: bundled_skeleton_path(),
        output: dir.path().join("include").join("nonstd").join("variant.hpp"),
        type_count: Some(4),
        visitor_arity: Some(2),
        options: GenerateOptions::default(),
    };

    let first = run_generate(&request).unwrap();
    let bytes = std::fs::read(&request.output).unwrap();
    let second = run_generate(&request).unwrap();

    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(std::fs::read(&request.output).unwrap(), bytes);
    assert!(run_check(&request).unwrap().up_to_date);
}
