/// Expands `$body` once for the concrete Rust type matching the runtime `ElementKind` `$kind`. Inside
/// `$body`, the type is available under the name `$t`
macro_rules! match_element_kind {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            $crate::layout::ElementKind::I8 => {
                type $t = i8;
                $body
            }
            $crate::layout::ElementKind::I16 => {
                type $t = i16;
                $body
            }
            $crate::layout::ElementKind::I32 => {
                type $t = i32;
                $body
            }
            $crate::layout::ElementKind::F32 => {
                type $t = f32;
                $body
            }
            $crate::layout::ElementKind::F64 => {
                type $t = f64;
                $body
            }
        }
    };
}
