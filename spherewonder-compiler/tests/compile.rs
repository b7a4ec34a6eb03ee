use spherewonder_compiler::{
    compile, compile_program, evaluate, parse, ArithmeticMode, CompileError, ShaderSettings,
};
use spherewonder_core::{escape_time, HomogeneousCoord};

#[test]
fn known_expressions_compile_to_expected_code() {
    let cases = [
        ("z^2 + c", ArithmeticMode::Projective, "_pAdd(_pMul(z, z), c)"),
        ("0.0", ArithmeticMode::Affine, "vec2(0.0, 0.0)"),
        ("c", ArithmeticMode::Affine, "(c.xy / (c.w + c.z))"),
        ("z^3 - 1", ArithmeticMode::Projective, "_pSub(_pMul(_pMul(z, z), z), vec4(1.0, 0.0, 1.0, 0.0))"),
        ("c * i", ArithmeticMode::Affine, "_cMul((c.xy / (c.w + c.z)), vec2(0.0, 1.0))"),
    ];
    for (source, mode, expected) in cases {
        assert_eq!(compile(source, mode).unwrap().as_str(), expected, "{source} ({mode})");
    }
}

#[test]
fn syntax_errors_carry_offsets() {
    match compile("z^2 + ", ArithmeticMode::Projective) {
        Err(CompileError::Syntax { offset, .. }) => assert_eq!(offset, 6),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn compiled_program_embeds_every_fragment_verbatim() {
    let settings = ShaderSettings {
        f_expr: "z^3 + c".to_string(),
        crit_expr: "0".to_string(),
        c_expr: "c * c".to_string(),
        max_iterations: 250,
    };
    let program = compile_program(&settings).unwrap();
    let f = compile(&settings.f_expr, ArithmeticMode::Projective).unwrap();
    let c = compile(&settings.c_expr, ArithmeticMode::Affine).unwrap();

    for fragment in [&program.parameter_fragment, &program.dynamical_fragment] {
        assert!(fragment.contains(f.as_str()));
        assert!(fragment.contains("const int MAX_ITERATIONS = 250;"));
        assert!(fragment.contains("float _pDist(vec4 a, vec4 b)"));
    }
    assert!(program.dynamical_fragment.contains(c.as_str()));
    assert!(!program.parameter_fragment.contains(c.as_str()));
}

#[test]
fn failed_compile_leaves_previous_program_usable() {
    let good = compile_program(&ShaderSettings::default()).unwrap();
    let bad = ShaderSettings {
        f_expr: "z^".to_string(),
        ..ShaderSettings::default()
    };
    assert!(compile_program(&bad).is_err());
    assert_eq!(compile_program(&ShaderSettings::default()).unwrap(), good);
}

#[test]
fn settings_round_trip_through_json() {
    let settings = ShaderSettings {
        f_expr: "z^2 + c".to_string(),
        crit_expr: "0".to_string(),
        c_expr: "c".to_string(),
        max_iterations: 64,
    };
    let json = serde_json::to_string(&settings).unwrap();
    assert!(json.contains("\"max_iterations\":64"));
    let back: ShaderSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);
}

#[test]
fn cpu_escape_time_with_parsed_map() {
    let f = parse("z^2 + c").unwrap();
    let iterate = |z: &HomogeneousCoord, c: &HomogeneousCoord| {
        evaluate(&f, z, c).unwrap_or(HomogeneousCoord::INFINITY)
    };

    // c = -1 keeps the critical orbit on the 2-cycle 0, -1
    let captive = escape_time(
        iterate,
        HomogeneousCoord::ZERO,
        HomogeneousCoord::from_real(-1.0),
        200,
    );
    assert!(!captive.escaped);

    // c = 1 escapes: 0, 1, 2, 5, 26, 677, ...
    let escaping = escape_time(
        iterate,
        HomogeneousCoord::ZERO,
        HomogeneousCoord::from_real(1.0),
        200,
    );
    assert!(escaping.escaped);
    assert_eq!(escaping.iterations, 6);
}
