// Macros to simplify rule, equation and system declarations

macro_rules! rules {
    () => {
        Vec::<$crate::rewriting::Rule>::new()
    };
    ($from:tt => $to:tt $(, $($rest:tt)*)?) => {{
        let mut v = Vec::new();
        v.push($crate::rewriting::Rule::from_strings($from, $to).expect("malformed rule"));
        $( v.extend($crate::macros::rules!($($rest)*)); )?
        v
    }};
}

macro_rules! equations {
    () => {
        Vec::<$crate::rewriting::Equation>::new()
    };
    ($lhs:tt = $rhs:tt $(, $($rest:tt)*)?) => {{
        let mut v = Vec::new();
        v.push($crate::rewriting::Equation::from_strings($lhs, $rhs).expect("malformed equation"));
        $( v.extend($crate::macros::equations!($($rest)*)); )?
        v
    }};
}

macro_rules! system {
    (rules: [ $($rules:tt)* ], equations: [ $($equations:tt)* ] $(,)?) => {
        $crate::rewriting::System::new(
            $crate::macros::rules!($($rules)*),
            $crate::macros::equations!($($equations)*),
        )
    };
}

pub(crate) use {equations, rules, system};
