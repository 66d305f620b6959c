use winapi::ctypes::c_void;
use winapi::um::unknwnbase::IUnknown;
use winapi::Interface;

use std::fmt;
use std::ops::Deref;
use std::ptr;

/// Owning pointer to a COM interface. Releases on drop, AddRefs on clone.
#[repr(transparent)]
pub struct ComPtr<T>(*mut T);

impl<T> ComPtr<T> {
    pub fn empty() -> Self {
        ComPtr(ptr::null_mut())
    }

    /// Takes ownership of `raw` without touching its reference count.
    pub unsafe fn from_ptr(raw: *mut T) -> Self {
        ComPtr(raw)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn as_ptr(&self) -> *mut T {
        self.0
    }

    /// Out-parameter slot for creation calls. Only valid while empty.
    pub unsafe fn as_mut_void(&mut self) -> *mut *mut c_void {
        &mut self.0 as *mut *mut _ as *mut *mut _
    }

    fn as_unknown(&self) -> &IUnknown {
        debug_assert!(!self.is_null());
        unsafe { &*(self.0 as *mut IUnknown) }
    }
}

impl<T> Drop for ComPtr<T> {
    fn drop(&mut self) {
        if !self.is_null() {
            unsafe {
                self.as_unknown().Release();
            }
        }
    }
}

impl<T: Interface> Clone for ComPtr<T> {
    fn clone(&self) -> Self {
        debug_assert!(!self.is_null());
        unsafe {
            self.as_unknown().AddRef();
            ComPtr::from_ptr(self.0)
        }
    }
}

impl<T> Deref for ComPtr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        debug_assert!(!self.is_null());
        unsafe { &*self.0 }
    }
}

impl<T> fmt::Debug for ComPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComPtr({:p})", self.0)
    }
}
