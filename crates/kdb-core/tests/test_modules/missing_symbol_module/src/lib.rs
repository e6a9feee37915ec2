// The loader looks for `elektraPluginSymbol`; this module exports a
// near miss so the library opens but resolution fails.
#[unsafe(no_mangle)]
pub extern "C" fn elektraPluginSymbolMisspelled() -> *const u8 {
    std::ptr::null()
}
