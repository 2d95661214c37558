use std::cell::RefCell;
use std::ffi::CStr;
use std::os::raw::c_char;
thread_local! {
    // Written by the native callback, drained right after each call on the same thread.
    static PENDING: RefCell<Option<String>> = const { RefCell::new(None) };
}
/// Callback handed to `RegisterExceptionCallback`.
pub(crate) extern "C" fn on_native_exception(message: *const c_char) {
    let text = if message.is_null() {
        String::from("unknown native exception (null message)")
    } else {
        // Safety: the native side passes a null-terminated buffer valid for this call.
        unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned()
    };
    log::trace!("native exception captured: {text}");
    PENDING.with(|slot| {
        *slot.borrow_mut() = Some(text);
    });
}
/// Takes and clears the message captured since the last check.
pub(crate) fn take_pending() -> Option<String> {
    PENDING.with(|slot| slot.borrow_mut().take())
}
