use crate::inference::frame::Frame;
use phpscope_api::SymbolContext;
use serde::Serialize;

/// What sits at a byte offset and the frame it was resolved in.
#[derive(Debug, Clone, Serialize)]
pub struct ReflectionOffset {
    symbol_context: SymbolContext,
    frame: Frame,
}

impl ReflectionOffset {
    pub fn new(symbol_context: SymbolContext, frame: Frame) -> Self {
        Self {
            symbol_context,
            frame,
        }
    }

    pub fn symbol_context(&self) -> &SymbolContext {
        &self.symbol_context
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}
