/// Builds a [`Listener`](crate::Listener) forwarding to `handler.method(id, value)`.
/// `handler` must be an `Arc`.
#[macro_export]
macro_rules! listener {
    ($handler:ident.$method:ident) => {
        $crate::Listener::new({
            let handler = $handler.clone();
            move |id, value| {
                handler.$method(id, value);
            }
        })
    };
}
